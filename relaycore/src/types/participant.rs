use serde::{Deserialize, Serialize};

/// A conversation member as seen by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    pub user_id: i64,
    /// Addressable identity used for delivery (e.g. an email).
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Participants that left the conversation are kept but never called.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ParticipantProfile {
    pub fn new(user_id: i64, handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id,
            handle: handle.into(),
            name: name.into(),
            image_url: None,
            active: true,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
