//! Best-effort delivery to the other party of a call.

use crate::directory::SessionDirectory;
use log::debug;
use std::sync::Arc;

/// Hands payloads to the session directory.
///
/// Delivery is at most once: an offline target gets nothing, and nothing is
/// queued or retried.
#[derive(Clone)]
pub struct RelayEngine {
    directory: Arc<dyn SessionDirectory>,
}

impl RelayEngine {
    pub fn new(directory: Arc<dyn SessionDirectory>) -> Self {
        Self { directory }
    }

    /// Returns whether the payload reached a live channel.
    pub async fn relay(&self, tenant: &str, target: &str, payload: String) -> bool {
        if !self.directory.is_connected(tenant, target) {
            debug!("No live session for {target} in tenant {tenant}, dropping relay");
            return false;
        }
        let delivered = self.directory.deliver(tenant, target, payload).await;
        if !delivered {
            debug!("Session for {target} in tenant {tenant} closed before delivery");
        }
        delivered
    }
}
