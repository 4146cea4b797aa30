use async_trait::async_trait;
use dashmap::DashMap;
use relaycore::store::{CallLogStore, ConversationStore, Result};
use relaycore::types::{CallOutcome, ParticipantProfile};

type ConversationKey = (String, i64);

/// Conversations and call logs held in memory. Used by tests and by the
/// server when no data directory is wanted.
#[derive(Default)]
pub struct MemoryStore {
    conversations: DashMap<ConversationKey, Vec<ParticipantProfile>>,
    call_logs: DashMap<ConversationKey, Vec<CallOutcome>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a conversation.
    pub fn add_conversation(
        &self,
        tenant: &str,
        conversation_id: i64,
        participants: Vec<ParticipantProfile>,
    ) {
        self.conversations
            .insert((tenant.to_string(), conversation_id), participants);
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn participants(
        &self,
        tenant: &str,
        conversation_id: i64,
    ) -> Result<Vec<ParticipantProfile>> {
        Ok(self
            .conversations
            .get(&(tenant.to_string(), conversation_id))
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl CallLogStore for MemoryStore {
    async fn save_call_outcome(&self, tenant: &str, outcome: &CallOutcome) -> Result<()> {
        let mut log = self
            .call_logs
            .entry((tenant.to_string(), outcome.conversation_id))
            .or_default();
        // Kept oldest first; writes land in whatever order their tasks finish.
        let key = (outcome.started_at, outcome.ended_at);
        let at = log.partition_point(|o| (o.started_at, o.ended_at) <= key);
        log.insert(at, outcome.clone());
        Ok(())
    }

    async fn call_outcomes(&self, tenant: &str, conversation_id: i64) -> Result<Vec<CallOutcome>> {
        Ok(self
            .call_logs
            .get(&(tenant.to_string(), conversation_id))
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
