//! Writes the terminal record of a call.

use super::state::ActiveCall;
use chrono::{DateTime, Utc};
use log::{debug, error};
use relaycore::store::CallLogStore;
use relaycore::types::CallStatus;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Turns ended calls into durable call-log entries.
///
/// Each write runs on its own task. A failed write is logged and otherwise
/// ignored: by the time it runs, the call has left the registry and the
/// terminal signal has already been relayed.
#[derive(Clone)]
pub struct CallOutcomeRecorder {
    store: Arc<dyn CallLogStore>,
}

impl CallOutcomeRecorder {
    pub fn new(store: Arc<dyn CallLogStore>) -> Self {
        Self { store }
    }

    /// Record `call` as ending now with `status`.
    pub fn record(&self, call: ActiveCall, status: CallStatus) -> JoinHandle<()> {
        self.record_at(call, status, Utc::now())
    }

    /// Record `call` as ending at `ended_at`.
    pub fn record_at(
        &self,
        call: ActiveCall,
        status: CallStatus,
        ended_at: DateTime<Utc>,
    ) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            let outcome = call.outcome(status, ended_at);
            match store.save_call_outcome(&call.tenant_id, &outcome).await {
                Ok(()) => debug!(
                    "Recorded call {} as {} ({}s)",
                    outcome.call_id,
                    outcome.status,
                    outcome.duration_secs()
                ),
                Err(e) => error!(
                    "Failed to record outcome of call {} ({}): {}",
                    outcome.call_id, outcome.status, e
                ),
            }
        })
    }
}
