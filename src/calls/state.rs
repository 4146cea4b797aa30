//! In-memory state of a live call.

use chrono::{DateTime, Utc};
use relaycore::types::{CallOutcome, CallStatus};

/// Everything needed to relay a live call and log it once it ends.
///
/// Fields are set when the OFFER is accepted and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCall {
    pub call_id: String,
    pub tenant_id: String,
    pub conversation_id: i64,
    pub caller_handle: String,
    pub callee_handle: String,
    pub caller_user_id: i64,
    pub callee_user_id: i64,
    pub is_video: bool,
    /// Join time written for both participants.
    pub started_at: DateTime<Utc>,
}

impl ActiveCall {
    /// Whether `handle` is the caller or the callee.
    pub fn involves(&self, handle: &str) -> bool {
        handle == self.caller_handle || handle == self.callee_handle
    }

    /// The participant a signal from `sender` should be delivered to.
    pub fn other_party(&self, sender: &str) -> Option<&str> {
        if sender == self.caller_handle {
            Some(&self.callee_handle)
        } else if sender == self.callee_handle {
            Some(&self.caller_handle)
        } else {
            None
        }
    }

    /// Terminal record for this call, ending at `ended_at`.
    pub fn outcome(&self, status: CallStatus, ended_at: DateTime<Utc>) -> CallOutcome {
        CallOutcome::new(
            self.call_id.clone(),
            self.conversation_id,
            self.is_video,
            self.caller_user_id,
            self.callee_user_id,
            self.started_at,
            ended_at,
            status,
        )
    }
}

#[cfg(test)]
pub(crate) fn sample_call(call_id: &str) -> ActiveCall {
    ActiveCall {
        call_id: call_id.to_string(),
        tenant_id: "acme".to_string(),
        conversation_id: 7,
        caller_handle: "alice@acme.test".to_string(),
        callee_handle: "bob@acme.test".to_string(),
        caller_user_id: 1,
        callee_user_id: 2,
        is_video: false,
        started_at: Utc::now(),
    }
}
