//! Border lifecycle: per-player (re)initialization and the global toggle.
//!
//! A player's border goes from *uninitialized* to *bordered* on every join
//! and every world change. Nothing moves it back on disconnect; the health
//! cache prune is the only cleanup.

use crate::formula::{health_percentage, BorderParams};
use crate::gateway::BorderGateway;
use crate::state::TintHealthState;
use tint_event_system::PlayerSnapshot;
use tracing::{debug, info};

/// Outcome of a global enable/disable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The feature went from disabled to enabled
    Enabled,
    /// The feature went from enabled to disabled
    Disabled,
    /// Enable was requested while already enabled
    AlreadyEnabled,
    /// Disable was requested while already disabled
    AlreadyDisabled,
}

impl Transition {
    /// Whether the flag actually changed.
    pub fn changed(&self) -> bool {
        matches!(self, Transition::Enabled | Transition::Disabled)
    }
}

/// Applies lifecycle transitions through the border gateway.
#[derive(Clone)]
pub struct LifecycleController {
    gateway: BorderGateway,
}

impl LifecycleController {
    pub fn new(gateway: BorderGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &BorderGateway {
        &self.gateway
    }

    /// Initializes the player's border and immediately applies their health.
    ///
    /// Safe to repeat: a second call pushes the same values again.
    pub fn init_border(&self, player: &PlayerSnapshot) -> BorderParams {
        self.gateway.initialize(player);
        self.gateway
            .update(player, health_percentage(player.health, player.max_health))
    }

    /// Handles a player joining the server.
    pub fn on_player_connected(&self, player: &PlayerSnapshot) -> BorderParams {
        debug!("🟢 {} joined, initializing border", player.name);
        self.init_border(player)
    }

    /// Handles a player arriving in a different world, whose client has
    /// discarded the previous border context.
    pub fn on_player_changed_world(&self, player: &PlayerSnapshot) -> BorderParams {
        debug!("🌍 {} entered {}, re-initializing border", player.name, player.world);
        self.init_border(player)
    }

    /// Borders the players already online when the plugin starts.
    ///
    /// Does nothing while disabled. Each adopted player's health is cached,
    /// so the first tick does not push the same values again.
    ///
    /// # Returns
    ///
    /// The number of players bordered.
    pub fn adopt_online(&self, state: &mut TintHealthState, players: &[PlayerSnapshot]) -> usize {
        if !state.border_enabled {
            return 0;
        }

        for player in players {
            self.init_border(player);
            state.health_cache.set(player.id, player.health);
        }
        if !players.is_empty() {
            debug!("🟥 Bordered {} players already online", players.len());
        }
        players.len()
    }

    /// Turns the feature on and borders every connected player.
    pub fn enable(&self, state: &mut TintHealthState, players: &[PlayerSnapshot]) -> Transition {
        if state.border_enabled {
            return Transition::AlreadyEnabled;
        }

        state.border_enabled = true;
        for player in players {
            self.init_border(player);
        }
        info!("🟥 Health border enabled for {} players", players.len());
        Transition::Enabled
    }

    /// Turns the feature off and restores every connected player's global border.
    pub fn disable(&self, state: &mut TintHealthState, players: &[PlayerSnapshot]) -> Transition {
        if !state.border_enabled {
            return Transition::AlreadyDisabled;
        }

        state.border_enabled = false;
        for player in players {
            self.gateway.reset_to_global(player.id);
        }
        info!("⬜ Health border disabled for {} players", players.len());
        Transition::Disabled
    }
}
