//! Session directory: who is connected, and how to reach them.

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Resolves a `(tenant, handle)` pair to a live delivery channel.
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Whether a delivery channel exists for the handle right now.
    fn is_connected(&self, tenant: &str, handle: &str) -> bool;

    /// Deliver a text payload. Returns `false` when nothing was delivered.
    async fn deliver(&self, tenant: &str, handle: &str, payload: String) -> bool;
}

/// Outbound half of a registered session.
#[derive(Debug)]
struct Session {
    id: u64,
    tx: mpsc::UnboundedSender<String>,
}

/// In-process directory backed by per-connection channels.
///
/// A handle has at most one live session; registering again replaces the
/// previous one, which then stops receiving.
#[derive(Debug, Default)]
pub struct ChannelDirectory {
    sessions: DashMap<(String, String), Session>,
    next_id: AtomicU64,
}

/// Proof of registration, used to unregister only the session it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(u64);

impl ChannelDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and get the receiver its write pump drains.
    pub fn register(
        &self,
        tenant: &str,
        handle: &str,
    ) -> (SessionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if self
            .sessions
            .insert(Self::key(tenant, handle), Session { id, tx })
            .is_some()
        {
            debug!("Replaced existing session for {handle} in tenant {tenant}");
        }
        (SessionId(id), rx)
    }

    /// Remove the session, unless it was already replaced by a newer one.
    pub fn unregister(&self, tenant: &str, handle: &str, session: SessionId) -> bool {
        self.sessions
            .remove_if(&Self::key(tenant, handle), |_, current| current.id == session.0)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn key(tenant: &str, handle: &str) -> (String, String) {
        (tenant.to_string(), handle.to_string())
    }
}

#[async_trait]
impl SessionDirectory for ChannelDirectory {
    fn is_connected(&self, tenant: &str, handle: &str) -> bool {
        self.sessions
            .get(&Self::key(tenant, handle))
            .is_some_and(|session| !session.tx.is_closed())
    }

    async fn deliver(&self, tenant: &str, handle: &str, payload: String) -> bool {
        let Some(session) = self.sessions.get(&Self::key(tenant, handle)) else {
            return false;
        };
        session.tx.send(payload).is_ok()
    }
}
