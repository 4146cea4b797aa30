//! Inbound signal parsing and outbound message shapes.

use super::error::CallError;
use super::signaling::SignalType;
use serde::{Deserialize, Serialize};

/// Identity bound to the transport session a signal arrived on.
///
/// Both fields come from the transport, never from the signal payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub tenant_id: Option<String>,
    pub sender_handle: Option<String>,
}

impl SessionContext {
    pub fn new(tenant_id: impl Into<String>, sender_handle: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            sender_handle: Some(sender_handle.into()),
        }
    }

    /// Tenant and sender, or `MissingContext` when either is absent or empty.
    pub fn resolve(&self) -> Result<(&str, &str), CallError> {
        match (self.tenant_id.as_deref(), self.sender_handle.as_deref()) {
            (Some(tenant), Some(sender)) if !tenant.is_empty() && !sender.is_empty() => {
                Ok((tenant, sender))
            }
            _ => Err(CallError::MissingContext),
        }
    }
}

/// Routing fields of a signal. Everything else in the payload is opaque.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignalHeader {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    call_id: Option<String>,
    #[serde(default)]
    conversation_id: Option<i64>,
    #[serde(default)]
    is_video: Option<bool>,
}

/// A parsed inbound signal that keeps its original text for relaying.
#[derive(Debug, Clone)]
pub struct InboundSignal {
    /// The `type` field as sent.
    pub kind: String,
    pub call_id: Option<String>,
    pub conversation_id: Option<i64>,
    pub is_video: Option<bool>,
    raw: String,
}

impl InboundSignal {
    /// Parse the routing header of a JSON signal.
    ///
    /// Only `type`, `callId`, `conversationId` and `isVideo` are read; the
    /// rest of the payload is never inspected.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CallError> {
        let raw = raw.into();
        let header: SignalHeader =
            serde_json::from_str(&raw).map_err(|e| CallError::Malformed(e.to_string()))?;
        Ok(Self {
            kind: header.kind,
            call_id: header.call_id.filter(|id| !id.is_empty()),
            conversation_id: header.conversation_id,
            is_video: header.is_video,
            raw,
        })
    }

    /// Classified type, `None` for types this relay does not know.
    pub fn signal_type(&self) -> Option<SignalType> {
        SignalType::from_tag(&self.kind)
    }

    pub fn require_call_id(&self) -> Result<&str, CallError> {
        self.call_id
            .as_deref()
            .ok_or(CallError::MissingAttribute("callId"))
    }

    /// The signal exactly as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Notice sent to the callee when an OFFER is accepted by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingCallNotice {
    #[serde(rename = "type")]
    pub kind: String,
    pub call_id: String,
    pub conversation_id: i64,
    pub is_video: bool,
    pub caller_name: String,
    pub caller_user_id: i64,
    pub caller_image_url: Option<String>,
}

impl IncomingCallNotice {
    pub const TYPE: &'static str = "INCOMING_CALL";

    pub fn new(
        call_id: impl Into<String>,
        conversation_id: i64,
        is_video: bool,
        caller_name: impl Into<String>,
        caller_user_id: i64,
        caller_image_url: Option<String>,
    ) -> Self {
        Self {
            kind: Self::TYPE.to_string(),
            call_id: call_id.into(),
            conversation_id,
            is_video,
            caller_name: caller_name.into(),
            caller_user_id,
            caller_image_url,
        }
    }

    pub fn to_json(&self) -> Result<String, CallError> {
        serde_json::to_string(self).map_err(|e| CallError::Malformed(e.to_string()))
    }
}
