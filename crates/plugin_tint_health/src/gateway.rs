//! Adapter between the plugin and the world-border rendering service.

use crate::error::TintHealthError;
use crate::formula::{compute_border, BorderParams};
use std::sync::Arc;
use tint_event_system::{
    PlayerId, PlayerSnapshot, ServiceRegistry, WorldBorderAction, WorldBorderApi,
};
use tracing::trace;

/// Size pushed on initialization so no wall is ever visible.
pub const UNBOUNDED_BORDER_SIZE: f64 = f64::MAX;

/// Pushes per-player border changes to the rendering service.
///
/// Cheap to clone; every clone talks to the same service.
#[derive(Clone)]
pub struct BorderGateway {
    api: Arc<dyn WorldBorderApi>,
}

impl BorderGateway {
    pub fn new(api: Arc<dyn WorldBorderApi>) -> Self {
        Self { api }
    }

    /// Resolves the rendering service from the host's service registry.
    ///
    /// # Errors
    ///
    /// `TintHealthError::BorderServiceMissing` if no provider is registered.
    pub fn from_services(services: &ServiceRegistry) -> Result<Self, TintHealthError> {
        services
            .get::<dyn WorldBorderApi>()
            .map(Self::new)
            .ok_or(TintHealthError::BorderServiceMissing)
    }

    /// Creates the player's border context centered on them.
    ///
    /// Must precede any update for a border context the client has not seen,
    /// which includes every join and every world change.
    pub fn initialize(&self, player: &PlayerSnapshot) {
        let mut border = self.api.world_border(player.id);
        border
            .set_center(player.position.horizontal())
            .set_size(UNBOUNDED_BORDER_SIZE);
        self.api
            .send(player.id, &border, WorldBorderAction::Initialize);
        trace!("🟦 Initialized border for {}", player.name);
    }

    /// Recomputes the border for `percentage` (0-100) and pushes it.
    ///
    /// Sends `SetCenter`, `LerpSize` and `SetWarningBlocks`, in that order.
    ///
    /// # Returns
    ///
    /// The parameters that were pushed.
    pub fn update(&self, player: &PlayerSnapshot, percentage: f64) -> BorderParams {
        let params = compute_border(percentage / 100.0);

        let mut border = self.api.world_border(player.id);
        border
            .set_center(player.position.horizontal())
            .set_warning_distance_in_blocks(params.warning_distance)
            .lerp(params.size, params.size, params.lerp_duration_ticks);

        for action in [
            WorldBorderAction::SetCenter,
            WorldBorderAction::LerpSize,
            WorldBorderAction::SetWarningBlocks,
        ] {
            self.api.send(player.id, &border, action);
        }

        trace!(
            "🟥 {} at {:.1}% → warning distance {}",
            player.name,
            percentage,
            params.warning_distance
        );
        params
    }

    /// Drops the player's override so they see the world's global border.
    pub fn reset_to_global(&self, player_id: PlayerId) {
        self.api.reset_world_border_to_global(player_id);
    }
}
