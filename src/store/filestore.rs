use async_trait::async_trait;
use relaycore::store::{CallLogStore, ConversationStore, Result, StoreError};
use relaycore::types::{CallOutcome, ParticipantProfile};
use serde::{Serialize, de::DeserializeOwned};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// JSON-file backed conversations and call logs.
///
/// Layout under the base directory:
///
/// ```text
/// conversations/<tenant>/<conversation_id>.json   participant list
/// call_logs/<tenant>/<conversation_id>/<started_ms>-<call_id>.json
/// ```
///
/// Tenants and call ids are percent-encoded.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub async fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        let base_path = path.into();
        let store = Self { base_path };

        fs::create_dir_all(store.path_for("conversations")).await?;
        fs::create_dir_all(store.path_for("call_logs")).await?;

        Ok(store)
    }

    fn path_for(&self, sub: &str) -> PathBuf {
        self.base_path.join(sub)
    }

    /// Percent-encode a key into one path component. Distinct keys never
    /// share a name, and `.` is escaped so no key can name `.` or `..`.
    fn encode_filename(key: &str) -> String {
        urlencoding::encode(key).replace('.', "%2E")
    }

    fn conversation_path(&self, tenant: &str, conversation_id: i64) -> PathBuf {
        self.path_for("conversations")
            .join(Self::encode_filename(tenant))
            .join(format!("{conversation_id}.json"))
    }

    fn call_log_dir(&self, tenant: &str, conversation_id: i64) -> PathBuf {
        self.path_for("call_logs")
            .join(Self::encode_filename(tenant))
            .join(conversation_id.to_string())
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match fs::read(path).await {
            Ok(data) => serde_json::from_slice(&data)
                .map(Some)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(path, data).await.map_err(StoreError::Io)
    }

    /// Create or replace a conversation's participant list.
    pub async fn put_conversation(
        &self,
        tenant: &str,
        conversation_id: i64,
        participants: &[ParticipantProfile],
    ) -> Result<()> {
        self.write_json(&self.conversation_path(tenant, conversation_id), &participants)
            .await
    }
}

#[async_trait]
impl ConversationStore for FileStore {
    async fn participants(
        &self,
        tenant: &str,
        conversation_id: i64,
    ) -> Result<Vec<ParticipantProfile>> {
        Ok(self
            .read_json(&self.conversation_path(tenant, conversation_id))
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl CallLogStore for FileStore {
    async fn save_call_outcome(&self, tenant: &str, outcome: &CallOutcome) -> Result<()> {
        let file_name = format!(
            "{}-{}.json",
            outcome.started_at.timestamp_millis(),
            Self::encode_filename(&outcome.call_id)
        );
        let path = self
            .call_log_dir(tenant, outcome.conversation_id)
            .join(file_name);
        self.write_json(&path, outcome).await
    }

    async fn call_outcomes(&self, tenant: &str, conversation_id: i64) -> Result<Vec<CallOutcome>> {
        let dir = self.call_log_dir(tenant, conversation_id);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut outcomes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(outcome) = self.read_json::<CallOutcome>(&path).await? {
                outcomes.push(outcome);
            }
        }
        outcomes.sort_by_key(|o| (o.started_at, o.ended_at));
        Ok(outcomes)
    }
}
