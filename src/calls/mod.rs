//! Call signaling core.
//!
//! Relays call-establishment signals between the two participants of a 1:1
//! conversation and writes one call-log entry per finished call.
//!
//! # Architecture
//!
//! - [`SignalType`]: the inbound signal types and their classification
//! - [`InboundSignal`] & [`SessionContext`]: a signal plus the identity of the
//!   session it arrived on
//! - [`CallRegistry`]: live calls, with atomic insert and removal
//! - [`SignalRouter`]: lifecycle transitions and pass-through relay
//! - [`RelayEngine`]: best-effort delivery through a session directory
//! - [`CallOutcomeRecorder`]: detached durable write of the final record
//!
//! # Signal flow
//!
//! An OFFER registers the call and sends the callee an `INCOMING_CALL`
//! notice. ACCEPTED and the negotiation signals (SDP, ICE, media toggles)
//! are forwarded unchanged to the other party. REJECTED, CANCELLED, ENDED
//! and TIMEOUT remove the call, are forwarded, and produce the call log.

mod error;
mod message;
mod recorder;
mod registry;
mod relay;
mod router;
mod signaling;
mod state;

pub use error::CallError;
pub use message::{IncomingCallNotice, InboundSignal, SessionContext};
pub use recorder::CallOutcomeRecorder;
pub use registry::CallRegistry;
pub use relay::RelayEngine;
pub use router::{Routed, SignalRouter};
pub use signaling::SignalType;
pub use state::ActiveCall;
