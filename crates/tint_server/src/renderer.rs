//! In-memory world-border provider.
//!
//! Stands in for a client-facing border service: it keeps each player's
//! override and records every action that would have been sent over the
//! wire, so the console and tests can inspect what a client would see.
//! A player's entries are dropped when they disconnect.

use dashmap::DashMap;
use std::collections::VecDeque;
use tint_event_system::{PlayerId, WorldBorder, WorldBorderAction, WorldBorderApi};
use tracing::{debug, trace};

/// Actions kept per player; older ones are discarded first.
pub const ACTION_HISTORY_LIMIT: usize = 64;

#[derive(Default)]
pub struct InMemoryBorderRenderer {
    borders: DashMap<PlayerId, WorldBorder>,
    sent: DashMap<PlayerId, VecDeque<WorldBorderAction>>,
}

impl InMemoryBorderRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The player's override, or `None` if they see the global border.
    pub fn border_of(&self, player_id: PlayerId) -> Option<WorldBorder> {
        self.borders.get(&player_id).map(|entry| entry.value().clone())
    }

    /// The most recent actions sent to the player, oldest first.
    pub fn actions_for(&self, player_id: PlayerId) -> Vec<WorldBorderAction> {
        self.sent
            .get(&player_id)
            .map(|entry| entry.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn count_action(&self, player_id: PlayerId, action: WorldBorderAction) -> usize {
        self.sent
            .get(&player_id)
            .map(|entry| entry.iter().filter(|a| **a == action).count())
            .unwrap_or(0)
    }

    /// Total number of actions sent to anyone.
    pub fn total_sent(&self) -> usize {
        self.sent.iter().map(|entry| entry.value().len()).sum()
    }

    /// Players with a per-player override.
    pub fn override_count(&self) -> usize {
        self.borders.len()
    }

    /// Drops the override and action history of a disconnected player.
    pub fn forget(&self, player_id: PlayerId) {
        self.borders.remove(&player_id);
        self.sent.remove(&player_id);
        trace!("🖼️ Forgot border state of {}", player_id);
    }
}

impl WorldBorderApi for InMemoryBorderRenderer {
    fn world_border(&self, player_id: PlayerId) -> WorldBorder {
        self.border_of(player_id).unwrap_or_else(WorldBorder::global)
    }

    fn send(&self, player_id: PlayerId, border: &WorldBorder, action: WorldBorderAction) {
        debug!(
            "🖼️ {:?} -> {} (warning {} blocks)",
            action, player_id, border.warning_blocks
        );
        self.borders.insert(player_id, border.clone());
        let mut history = self.sent.entry(player_id).or_default();
        if history.len() == ACTION_HISTORY_LIMIT {
            history.pop_front();
        }
        history.push_back(action);
    }

    fn reset_world_border_to_global(&self, player_id: PlayerId) {
        debug!("🖼️ Reset {} to the global border", player_id);
        self.borders.remove(&player_id);
    }
}
