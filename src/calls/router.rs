//! Signal routing: lifecycle transitions and pass-through relay.

use super::error::CallError;
use super::message::{IncomingCallNotice, InboundSignal, SessionContext};
use super::recorder::CallOutcomeRecorder;
use super::registry::CallRegistry;
use super::relay::RelayEngine;
use super::signaling::SignalType;
use super::state::ActiveCall;
use crate::directory::SessionDirectory;
use chrono::{Duration, Utc};
use log::{debug, info, warn};
use relaycore::store::{CallLogStore, ConversationStore};
use relaycore::types::CallStatus;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What the router did with a signal it accepted.
#[derive(Debug)]
pub enum Routed {
    /// A call was registered and the callee was sent an incoming-call notice.
    Offered {
        call_id: String,
        callee: String,
        delivered: bool,
    },
    /// The signal was forwarded unchanged; the call stays active.
    Relayed {
        signal: SignalType,
        call_id: String,
        target: String,
        delivered: bool,
    },
    /// The call left the registry, the signal was forwarded, and its outcome
    /// is being written on `recording`.
    Terminated {
        signal: SignalType,
        call_id: String,
        target: String,
        delivered: bool,
        status: CallStatus,
        recording: JoinHandle<()>,
    },
}

/// Classifies inbound signals and drives the per-call state machine.
///
/// A call id has no entry until its OFFER is accepted, keeps it through
/// ACCEPTED and every pass-through signal, and loses it on the first
/// terminal signal. Signals for the same call may be handled concurrently;
/// only the registry serializes them.
pub struct SignalRouter {
    registry: CallRegistry,
    conversations: Arc<dyn ConversationStore>,
    relay: RelayEngine,
    recorder: CallOutcomeRecorder,
}

impl SignalRouter {
    pub fn new(
        directory: Arc<dyn SessionDirectory>,
        conversations: Arc<dyn ConversationStore>,
        call_log: Arc<dyn CallLogStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry: CallRegistry::new(),
            conversations,
            relay: RelayEngine::new(directory),
            recorder: CallOutcomeRecorder::new(call_log),
        })
    }

    pub fn registry(&self) -> &CallRegistry {
        &self.registry
    }

    /// Handle one raw signal as its own task.
    pub fn submit(self: &Arc<Self>, ctx: SessionContext, raw: String) -> JoinHandle<bool> {
        let router = self.clone();
        tokio::spawn(async move { router.handle(&ctx, &raw).await })
    }

    /// Parse and route a raw signal, logging instead of failing.
    ///
    /// Returns `true` if the signal was acted upon.
    pub async fn handle(&self, ctx: &SessionContext, raw: &str) -> bool {
        let signal = match InboundSignal::parse(raw) {
            Ok(signal) => signal,
            Err(e) => {
                warn!("Dropping unparseable signal: {}", e);
                return false;
            }
        };

        let kind = signal.kind.clone();
        let call_id = signal.call_id.clone().unwrap_or_else(|| "-".to_string());
        match self.route(ctx, signal).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Dropping {} signal for call {}: {}", kind, call_id, e);
                false
            }
        }
    }

    /// Route a parsed signal.
    ///
    /// Every error is a reason to drop the signal; none of them leave the
    /// registry in a different state than before the call.
    pub async fn route(
        &self,
        ctx: &SessionContext,
        signal: InboundSignal,
    ) -> Result<Routed, CallError> {
        let (tenant, sender) = ctx.resolve()?;
        let kind = signal
            .signal_type()
            .ok_or_else(|| CallError::UnknownSignalType(signal.kind.clone()))?;

        match kind {
            SignalType::Offer => self.handle_offer(tenant, sender, &signal).await,
            _ if kind.is_terminal() => self.handle_terminal(kind, tenant, sender, &signal).await,
            _ => self.handle_relay(kind, tenant, sender, &signal).await,
        }
    }

    async fn handle_offer(
        &self,
        tenant: &str,
        sender: &str,
        signal: &InboundSignal,
    ) -> Result<Routed, CallError> {
        let call_id = signal.require_call_id()?;
        let conversation_id = signal
            .conversation_id
            .ok_or(CallError::MissingAttribute("conversationId"))?;
        let is_video = signal
            .is_video
            .ok_or(CallError::MissingAttribute("isVideo"))?;

        // Cheap early exit; `put` below is the authoritative check.
        if self.registry.get(call_id).is_some() {
            return Err(CallError::AlreadyExists(call_id.to_string()));
        }

        let others = self
            .conversations
            .other_participants(tenant, conversation_id, sender)
            .await?;
        let callee = match others.as_slice() {
            [callee] => callee.clone(),
            _ => {
                return Err(CallError::NoCounterparty {
                    conversation_id,
                    found: others.len(),
                });
            }
        };
        let caller = self
            .conversations
            .participant(tenant, conversation_id, sender)
            .await?
            .ok_or_else(|| CallError::NotParticipant {
                call_id: call_id.to_string(),
                handle: sender.to_string(),
            })?;

        let notice = IncomingCallNotice::new(
            call_id,
            conversation_id,
            is_video,
            caller.name.clone(),
            caller.user_id,
            caller.image_url.clone(),
        )
        .to_json()?;

        self.registry.put(ActiveCall {
            call_id: call_id.to_string(),
            tenant_id: tenant.to_string(),
            conversation_id,
            caller_handle: sender.to_string(),
            callee_handle: callee.handle.clone(),
            caller_user_id: caller.user_id,
            callee_user_id: callee.user_id,
            is_video,
            started_at: Utc::now(),
        })?;

        info!(
            "Call {} offered: {} -> {} (conversation {}, {})",
            call_id,
            sender,
            callee.handle,
            conversation_id,
            if is_video { "video" } else { "audio" }
        );

        let delivered = self.relay.relay(tenant, &callee.handle, notice).await;
        Ok(Routed::Offered {
            call_id: call_id.to_string(),
            callee: callee.handle,
            delivered,
        })
    }

    async fn handle_terminal(
        &self,
        kind: SignalType,
        tenant: &str,
        sender: &str,
        signal: &InboundSignal,
    ) -> Result<Routed, CallError> {
        let call_id = signal.require_call_id()?;
        let status = kind
            .terminal_status()
            .ok_or_else(|| CallError::UnknownSignalType(kind.to_string()))?;

        let call = self
            .registry
            .remove_for_participant(call_id, tenant, sender)?;
        let target = call
            .other_party(sender)
            .map(str::to_string)
            .ok_or_else(|| CallError::NotParticipant {
                call_id: call_id.to_string(),
                handle: sender.to_string(),
            })?;

        info!("Call {} {} by {}, logging as {}", call_id, kind, sender, status);

        let delivered = self
            .relay
            .relay(tenant, &target, signal.raw().to_string())
            .await;
        let recording = self.recorder.record(call, status);

        Ok(Routed::Terminated {
            signal: kind,
            call_id: call_id.to_string(),
            target,
            delivered,
            status,
            recording,
        })
    }

    async fn handle_relay(
        &self,
        kind: SignalType,
        tenant: &str,
        sender: &str,
        signal: &InboundSignal,
    ) -> Result<Routed, CallError> {
        let call_id = signal.require_call_id()?;
        let call = self
            .registry
            .get(call_id)
            .filter(|call| call.tenant_id == tenant)
            .ok_or_else(|| CallError::NotFound(call_id.to_string()))?;
        let target = call
            .other_party(sender)
            .map(str::to_string)
            .ok_or_else(|| CallError::NotParticipant {
                call_id: call_id.to_string(),
                handle: sender.to_string(),
            })?;

        if kind == SignalType::Accepted {
            info!("Call {} accepted by {}", call_id, sender);
        } else {
            debug!("Relaying {} for call {} to {}", kind, call_id, target);
        }

        let delivered = self
            .relay
            .relay(tenant, &target, signal.raw().to_string())
            .await;
        Ok(Routed::Relayed {
            signal: kind,
            call_id: call_id.to_string(),
            target,
            delivered,
        })
    }

    /// Remove calls older than `max_age` and log them as missed.
    ///
    /// A negative `max_age`, or one reaching past the earliest representable
    /// time, sweeps nothing.
    pub fn sweep_stale(&self, max_age: Duration) -> Vec<JoinHandle<()>> {
        if max_age < Duration::zero() {
            warn!("Ignoring negative stale call age {}s", max_age.num_seconds());
            return Vec::new();
        }
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            warn!(
                "Stale call age {}s is out of range, skipping sweep",
                max_age.num_seconds()
            );
            return Vec::new();
        };
        self.registry
            .drain_started_before(cutoff)
            .into_iter()
            .map(|call| {
                warn!(
                    "Call {} exceeded {}s without a terminal signal, logging as missed",
                    call.call_id,
                    max_age.num_seconds()
                );
                self.recorder.record(call, CallStatus::Missed)
            })
            .collect()
    }

    /// Periodically run [`sweep_stale`](Self::sweep_stale).
    pub fn run_stale_sweeper(
        self: Arc<Self>,
        interval: std::time::Duration,
        max_age: Duration,
    ) -> JoinHandle<()> {
        debug!(
            "Stale call sweeper started (interval {:?}, max age {}s)",
            interval,
            max_age.num_seconds()
        );
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let swept = self.sweep_stale(max_age);
                if !swept.is_empty() {
                    info!("Swept {} stale call(s)", swept.len());
                }
            }
        })
    }
}
