//! Last-observed health per connected player.

use std::collections::{HashMap, HashSet};
use tint_event_system::PlayerId;

/// Maps each connected player to the health value their border was last
/// computed from.
///
/// Entries are only ever removed by [`HealthCache::prune`], which the tick
/// loop calls with the current online set before diffing.
#[derive(Debug, Default, Clone)]
pub struct HealthCache {
    entries: HashMap<PlayerId, f64>,
}

impl HealthCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entry whose player is not in `connected`.
    ///
    /// # Returns
    ///
    /// The number of evicted entries.
    pub fn prune(&mut self, connected: &HashSet<PlayerId>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| connected.contains(id));
        before - self.entries.len()
    }

    /// Returns the last recorded health for `id`.
    pub fn get(&self, id: PlayerId) -> Option<f64> {
        self.entries.get(&id).copied()
    }

    /// Records `health` as the latest value for `id`.
    pub fn set(&mut self, id: PlayerId, health: f64) {
        self.entries.insert(id, health);
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
