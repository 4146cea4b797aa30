//! Durable call-log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final status of a terminated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    Rejected,
    Cancelled,
    Answered,
    Missed,
}

impl CallStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Answered => "ANSWERED",
            Self::Missed => "MISSED",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a terminated call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallParticipant {
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
    pub left_at: DateTime<Utc>,
}

/// The record written exactly once when a call leaves the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOutcome {
    pub call_id: String,
    pub conversation_id: i64,
    pub is_video: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub status: CallStatus,
    /// Caller first, callee second.
    pub participants: [CallParticipant; 2],
}

impl CallOutcome {
    /// Both participants share the call's join and leave times.
    pub fn new(
        call_id: impl Into<String>,
        conversation_id: i64,
        is_video: bool,
        caller_user_id: i64,
        callee_user_id: i64,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        status: CallStatus,
    ) -> Self {
        let participant = |user_id| CallParticipant {
            user_id,
            joined_at: started_at,
            left_at: ended_at,
        };
        Self {
            call_id: call_id.into(),
            conversation_id,
            is_video,
            started_at,
            ended_at,
            status,
            participants: [participant(caller_user_id), participant(callee_user_id)],
        }
    }

    /// Call length in whole seconds.
    pub fn duration_secs(&self) -> i64 {
        (self.ended_at - self.started_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_outcome_participants_share_timestamps() {
        let started = Utc::now();
        let ended = started + Duration::seconds(42);
        let outcome = CallOutcome::new("c1", 9, true, 1, 2, started, ended, CallStatus::Answered);

        assert_eq!(outcome.participants[0].user_id, 1);
        assert_eq!(outcome.participants[1].user_id, 2);
        for p in &outcome.participants {
            assert_eq!(p.joined_at, started);
            assert_eq!(p.left_at, ended);
        }
        assert_eq!(outcome.duration_secs(), 42);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&CallStatus::Missed).unwrap(),
            "\"MISSED\""
        );
        assert_eq!(CallStatus::Answered.to_string(), "ANSWERED");
    }

    #[test]
    fn test_outcome_json_shape() {
        let now = Utc::now();
        let outcome = CallOutcome::new("c1", 3, false, 10, 20, now, now, CallStatus::Rejected);
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["conversationId"], 3);
        assert_eq!(value["isVideo"], false);
        assert_eq!(value["status"], "REJECTED");
        assert_eq!(value["participants"].as_array().unwrap().len(), 2);
        assert_eq!(value["participants"][1]["userId"], 20);
    }
}
