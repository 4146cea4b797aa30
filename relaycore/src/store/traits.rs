use crate::store::error::Result;
use crate::types::{CallOutcome, ParticipantProfile};
use async_trait::async_trait;

/// Read access to conversation membership.
///
/// The relay only ever asks who is in a 1:1 conversation; membership and
/// permissions are owned elsewhere.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// All participants of a conversation, active or not. An unknown
    /// conversation yields an empty list.
    async fn participants(
        &self,
        tenant: &str,
        conversation_id: i64,
    ) -> Result<Vec<ParticipantProfile>>;

    /// Active participants other than `handle`.
    async fn other_participants(
        &self,
        tenant: &str,
        conversation_id: i64,
        handle: &str,
    ) -> Result<Vec<ParticipantProfile>> {
        Ok(self
            .participants(tenant, conversation_id)
            .await?
            .into_iter()
            .filter(|p| p.active && p.handle != handle)
            .collect())
    }

    /// The participant addressed by `handle`, if they belong to the conversation.
    async fn participant(
        &self,
        tenant: &str,
        conversation_id: i64,
        handle: &str,
    ) -> Result<Option<ParticipantProfile>> {
        Ok(self
            .participants(tenant, conversation_id)
            .await?
            .into_iter()
            .find(|p| p.handle == handle))
    }
}

/// Durable sink for terminated calls.
#[async_trait]
pub trait CallLogStore: Send + Sync {
    async fn save_call_outcome(&self, tenant: &str, outcome: &CallOutcome) -> Result<()>;

    /// Outcomes recorded for a conversation, oldest first.
    async fn call_outcomes(&self, tenant: &str, conversation_id: i64) -> Result<Vec<CallOutcome>>;
}
