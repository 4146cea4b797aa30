//! Real-time call signaling relay.
//!
//! Two participants of a conversation set up and tear down a call by
//! exchanging signals through this relay, which tracks live calls, forwards
//! negotiation payloads to the other party, and logs every finished call.

// Core types live in the runtime-free crate
pub use relaycore::types;

pub mod calls;
pub mod config;
pub mod directory;
pub mod server;
pub mod store;
