//! World-border rendering service interface.
//!
//! A border provider extension registers an `Arc<dyn WorldBorderApi>` in the
//! [`ServiceRegistry`](crate::ServiceRegistry). Consumers fetch a player's
//! [`WorldBorder`], adjust it, and then `send` one [`WorldBorderAction`] per
//! aspect they want the client to re-render.

use crate::PlayerId;
use serde::{Deserialize, Serialize};

/// Diameter of the default global world border.
pub const GLOBAL_BORDER_SIZE: f64 = 59_999_968.0;

/// Warning distance of the default global world border, in blocks.
pub const GLOBAL_WARNING_BLOCKS: i32 = 5;

/// A point on the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BorderPosition {
    /// X coordinate
    pub x: f64,
    /// Z coordinate
    pub z: f64,
}

impl BorderPosition {
    /// Creates a new horizontal position.
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// A pending size interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderLerp {
    /// Width the border grows or shrinks to
    pub target_width: f64,
    /// Height the border grows or shrinks to
    pub target_height: f64,
    /// Interpolation duration in ticks
    pub duration_ticks: u64,
}

/// Which part of a border the client should re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldBorderAction {
    /// Send the complete border; required before any other action for a
    /// border context the client has never seen
    Initialize,
    /// Move the border center
    SetCenter,
    /// Start the pending size interpolation
    LerpSize,
    /// Update the warning distance
    SetWarningBlocks,
}

/// Desired border parameters for one player.
///
/// Setters return `&mut Self` so adjustments can be chained before sending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldBorder {
    /// Border center on the horizontal plane
    pub center: BorderPosition,
    /// Current border diameter
    pub size: f64,
    /// Distance from the edge at which the warning vignette starts
    pub warning_blocks: i32,
    /// Interpolation scheduled by the last `lerp` call
    pub lerp: Option<BorderLerp>,
}

impl WorldBorder {
    /// The default border every world starts with.
    pub fn global() -> Self {
        Self {
            center: BorderPosition::default(),
            size: GLOBAL_BORDER_SIZE,
            warning_blocks: GLOBAL_WARNING_BLOCKS,
            lerp: None,
        }
    }

    /// Moves the border center.
    pub fn set_center(&mut self, center: BorderPosition) -> &mut Self {
        self.center = center;
        self
    }

    /// Sets the border diameter immediately.
    pub fn set_size(&mut self, size: f64) -> &mut Self {
        self.size = size;
        self
    }

    /// Sets the warning distance in blocks.
    pub fn set_warning_distance_in_blocks(&mut self, blocks: i32) -> &mut Self {
        self.warning_blocks = blocks;
        self
    }

    /// Schedules a size interpolation to the given target over `duration_ticks`.
    pub fn lerp(&mut self, target_width: f64, target_height: f64, duration_ticks: u64) -> &mut Self {
        self.lerp = Some(BorderLerp {
            target_width,
            target_height,
            duration_ticks,
        });
        self
    }
}

impl Default for WorldBorder {
    fn default() -> Self {
        Self::global()
    }
}

/// The world-border rendering service.
///
/// Every call is fire-and-forget from the caller's perspective: the
/// provider either renders the change or handles its own failures.
pub trait WorldBorderApi: Send + Sync {
    /// Returns the border currently associated with a player, falling back
    /// to the global border when the player has no override.
    fn world_border(&self, player_id: PlayerId) -> WorldBorder;

    /// Stores `border` as the player's override and pushes `action` to them.
    fn send(&self, player_id: PlayerId, border: &WorldBorder, action: WorldBorderAction);

    /// Drops the player's override so they see the world's global border again.
    fn reset_world_border_to_global(&self, player_id: PlayerId);
}
