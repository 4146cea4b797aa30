//! Call-related error types.
//!
//! None of these reach the sender: the router logs them and drops the signal.

use relaycore::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallError {
    #[error("missing tenant or sender in session context")]
    MissingContext,

    #[error("missing required attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("unknown signal type: {0}")]
    UnknownSignalType(String),

    #[error("malformed signal: {0}")]
    Malformed(String),

    #[error("call not found: {0}")]
    NotFound(String),

    #[error("call already exists: {0}")]
    AlreadyExists(String),

    #[error("no single counterparty in conversation {conversation_id} (found {found})")]
    NoCounterparty { conversation_id: i64, found: usize },

    #[error("{handle} is not a participant of call {call_id}")]
    NotParticipant { call_id: String, handle: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
