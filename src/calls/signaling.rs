//! Call signaling type definitions.
//!
//! Signals fall into two groups: lifecycle signals create or remove a
//! registry entry, pass-through signals are relayed to the other party
//! without touching call state.

use relaycore::types::CallStatus;
use std::fmt;

/// Inbound signaling message types.
///
/// The wire name of each type is its SCREAMING_SNAKE_CASE tag, carried in
/// the `type` field of the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalType {
    /// Caller starts a call. Creates the registry entry.
    Offer,
    /// Callee answered. The call stays active.
    Accepted,
    /// Callee declined.
    Rejected,
    /// Caller hung up before an answer.
    Cancelled,
    /// Either party hung up an established call.
    Ended,
    /// Client-side ring timeout elapsed.
    Timeout,

    /// Session description offer (opaque).
    SdpOffer,
    /// Session description answer (opaque).
    SdpAnswer,
    /// Connectivity candidate (opaque).
    IceCandidate,
    /// Camera switched on or off.
    ToggleVideo,
    /// Microphone muted or unmuted.
    ToggleAudio,
}

impl SignalType {
    /// All signal types in protocol order.
    pub const ALL: [SignalType; 11] = [
        Self::Offer,
        Self::Accepted,
        Self::Rejected,
        Self::Cancelled,
        Self::Ended,
        Self::Timeout,
        Self::SdpOffer,
        Self::SdpAnswer,
        Self::IceCandidate,
        Self::ToggleVideo,
        Self::ToggleAudio,
    ];

    pub const fn tag_name(&self) -> &'static str {
        match self {
            Self::Offer => "OFFER",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Ended => "ENDED",
            Self::Timeout => "TIMEOUT",
            Self::SdpOffer => "SDP_OFFER",
            Self::SdpAnswer => "SDP_ANSWER",
            Self::IceCandidate => "ICE_CANDIDATE",
            Self::ToggleVideo => "TOGGLE_VIDEO",
            Self::ToggleAudio => "TOGGLE_AUDIO",
        }
    }

    /// Parse from the wire tag. Tags are matched exactly.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "OFFER" => Some(Self::Offer),
            "ACCEPTED" => Some(Self::Accepted),
            "REJECTED" => Some(Self::Rejected),
            "CANCELLED" => Some(Self::Cancelled),
            "ENDED" => Some(Self::Ended),
            "TIMEOUT" => Some(Self::Timeout),
            "SDP_OFFER" => Some(Self::SdpOffer),
            "SDP_ANSWER" => Some(Self::SdpAnswer),
            "ICE_CANDIDATE" => Some(Self::IceCandidate),
            "TOGGLE_VIDEO" => Some(Self::ToggleVideo),
            "TOGGLE_AUDIO" => Some(Self::ToggleAudio),
            _ => None,
        }
    }

    /// Whether this signal changes registry state.
    pub const fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::Offer
                | Self::Accepted
                | Self::Rejected
                | Self::Cancelled
                | Self::Ended
                | Self::Timeout
        )
    }

    /// Whether this signal ends the call and produces a call log.
    pub const fn is_terminal(&self) -> bool {
        self.terminal_status().is_some()
    }

    /// Whether this signal is relayed verbatim with no state change.
    pub const fn is_pass_through(&self) -> bool {
        !self.is_lifecycle()
    }

    /// Final call status recorded for a terminal signal.
    ///
    /// ENDED maps to ANSWERED on the assumption that an ended call was
    /// answered first.
    pub const fn terminal_status(&self) -> Option<CallStatus> {
        match self {
            Self::Rejected => Some(CallStatus::Rejected),
            Self::Cancelled => Some(CallStatus::Cancelled),
            Self::Ended => Some(CallStatus::Answered),
            Self::Timeout => Some(CallStatus::Missed),
            _ => None,
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}
