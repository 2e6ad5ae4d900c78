//! Port claims
//!
//! Binding a port that is already taken fails the same way whether the
//! occupant is a session of this very process or something unrelated. The
//! registry records which console stream took over the process console for
//! each port, so that a second `set_trace` on the same port from the same
//! stream can be recognised as a harmless re-entry.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use transport::StreamId;

/// Process-wide table of port → owning stream identity
///
/// Every operation holds the lock only for the map access itself.
#[derive(Debug, Default)]
pub struct PortRegistry {
    claims: Mutex<HashMap<u16, StreamId>>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn claims(&self) -> MutexGuard<'_, HashMap<u16, StreamId>> {
        // the map is always left consistent, so a poisoned lock is still usable
        self.claims.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `owner` as the stream serving `port`, replacing any previous
    /// claim.
    pub fn claim(&self, port: u16, owner: StreamId) {
        if let Some(previous) = self.claims().insert(port, owner) {
            tracing::debug!(port, %previous, %owner, "replaced stale port claim");
        } else {
            tracing::debug!(port, %owner, "claimed port");
        }
    }

    /// Whether `port` is currently claimed by exactly `owner`
    pub fn is_claimed(&self, port: u16, owner: StreamId) -> bool {
        self.claims().get(&port) == Some(&owner)
    }

    pub fn claimant(&self, port: u16) -> Option<StreamId> {
        self.claims().get(&port).copied()
    }

    /// Release the claim on `port`
    ///
    /// Returns `false`, and logs, if the port was not claimed.
    pub fn unclaim(&self, port: u16) -> bool {
        match self.claims().remove(&port) {
            Some(owner) => {
                tracing::debug!(port, %owner, "released port claim");
                true
            }
            None => {
                tracing::warn!(port, "released a port that was not claimed");
                false
            }
        }
    }
}
