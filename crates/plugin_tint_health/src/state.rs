//! Mutable plugin state shared by the tick loop, event handlers and commands.

use crate::cache::HealthCache;
use parking_lot::Mutex;
use std::sync::Arc;

/// Everything the plugin mutates at runtime.
///
/// Only the Command Surface flips `border_enabled`; only the tick loop
/// writes `health_cache`.
#[derive(Debug, Default)]
pub struct TintHealthState {
    /// Global feature flag, persisted across restarts
    pub border_enabled: bool,
    /// Last observed health per connected player
    pub health_cache: HealthCache,
}

impl TintHealthState {
    pub fn new(border_enabled: bool) -> Self {
        Self {
            border_enabled,
            health_cache: HealthCache::new(),
        }
    }
}

/// Handle to the state, held by every callback the plugin registers.
///
/// Callbacks lock it for their whole run so they never interleave.
pub type SharedState = Arc<Mutex<TintHealthState>>;

pub fn shared_state(border_enabled: bool) -> SharedState {
    Arc::new(Mutex::new(TintHealthState::new(border_enabled)))
}
