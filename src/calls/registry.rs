//! Concurrent table of live calls.

use super::error::CallError;
use super::state::ActiveCall;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Live calls keyed by call id.
///
/// Every check-then-act transition goes through a single map operation, so
/// two signals racing on the same call id can never both observe and remove
/// the same entry.
#[derive(Debug, Default)]
pub struct CallRegistry {
    calls: DashMap<String, ActiveCall>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new call. Fails if the call id is already live.
    pub fn put(&self, call: ActiveCall) -> Result<(), CallError> {
        match self.calls.entry(call.call_id.clone()) {
            Entry::Occupied(_) => Err(CallError::AlreadyExists(call.call_id)),
            Entry::Vacant(slot) => {
                slot.insert(call);
                Ok(())
            }
        }
    }

    pub fn get(&self, call_id: &str) -> Option<ActiveCall> {
        self.calls.get(call_id).map(|entry| entry.value().clone())
    }

    /// Atomically take a call out of the registry.
    pub fn remove(&self, call_id: &str) -> Option<ActiveCall> {
        self.calls.remove(call_id).map(|(_, call)| call)
    }

    /// Atomically take a call out only if `handle` is one of its parties
    /// within `tenant`.
    pub fn remove_for_participant(
        &self,
        call_id: &str,
        tenant: &str,
        handle: &str,
    ) -> Result<ActiveCall, CallError> {
        if let Some((_, call)) = self.calls.remove_if(call_id, |_, call| {
            call.tenant_id == tenant && call.involves(handle)
        }) {
            return Ok(call);
        }
        if self.calls.contains_key(call_id) {
            Err(CallError::NotParticipant {
                call_id: call_id.to_string(),
                handle: handle.to_string(),
            })
        } else {
            Err(CallError::NotFound(call_id.to_string()))
        }
    }

    /// Remove and return every call started before `cutoff`.
    pub fn drain_started_before(&self, cutoff: DateTime<Utc>) -> Vec<ActiveCall> {
        let stale: Vec<String> = self
            .calls
            .iter()
            .filter(|entry| entry.started_at < cutoff)
            .map(|entry| entry.key().clone())
            .collect();

        // Re-check under the shard lock: a terminal signal may have won the race.
        stale
            .into_iter()
            .filter_map(|id| {
                self.calls
                    .remove_if(&id, |_, call| call.started_at < cutoff)
                    .map(|(_, call)| call)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
