//! Health percentage → border parameters.
//!
//! The border wall itself is pushed far away; only the warning distance
//! carries the signal. A large warning distance makes the client draw the red
//! vignette even though the wall is out of sight, and the tint strengthens
//! as the warning distance grows.

use serde::{Deserialize, Serialize};

/// Maximum health assumed when the host exposes no max-health attribute
pub const DEFAULT_MAX_HEALTH: f64 = 20.0;

/// Warning distance left at full health. Smaller offsets leave a dark
/// vignette visible outside the warning radius.
pub const WARNING_VIGNETTE_OFFSET: f64 = 100_000.0;

/// Warning distance gained between full health and zero health
pub const WARNING_TIGHTEN_RANGE: f64 = 600_000.0;

/// Blocks of warning distance removed per health percentage point
pub const WARNING_BLOCKS_PER_PERCENT: f64 = 6_000.0;

/// Width and height the border lerps to on every update
pub const BORDER_LERP_SIZE: f64 = 200_000.0;

/// Duration of the size interpolation, in ticks
pub const BORDER_LERP_TICKS: u64 = 4_000;

/// Border values derived from a player's health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderParams {
    /// Warning distance in blocks
    pub warning_distance: i32,
    /// Lerp target for both width and height
    pub size: f64,
    /// Lerp duration in ticks
    pub lerp_duration_ticks: u64,
}

/// Substitutes [`DEFAULT_MAX_HEALTH`] for a missing or unusable maximum.
pub fn effective_max_health(max_health: Option<f64>) -> f64 {
    match max_health {
        Some(max) if max.is_finite() && max > 0.0 => max,
        _ => DEFAULT_MAX_HEALTH,
    }
}

/// Health as a fraction of the (default-substituted) maximum, in `[0, 1]`.
pub fn health_fraction(health: f64, max_health: Option<f64>) -> f64 {
    clamp_fraction(health / effective_max_health(max_health))
}

/// Health as a percentage of the (default-substituted) maximum, in `[0, 100]`.
pub fn health_percentage(health: f64, max_health: Option<f64>) -> f64 {
    health_fraction(health, max_health) * 100.0
}

/// Computes the border for a health fraction.
///
/// `warning_distance = round(100000 - 6000 * percentage + 600000)`, which
/// runs from 700000 at 0% down to 100000 at 100%.
///
/// # Arguments
///
/// * `health_fraction` - Current health over max health. Values outside
///   `[0, 1]` are clamped and NaN counts as zero.
pub fn compute_border(health_fraction: f64) -> BorderParams {
    let percentage = clamp_fraction(health_fraction) * 100.0;
    let warning_distance =
        (WARNING_VIGNETTE_OFFSET - WARNING_BLOCKS_PER_PERCENT * percentage + WARNING_TIGHTEN_RANGE)
            .round() as i32;

    BorderParams {
        warning_distance,
        size: BORDER_LERP_SIZE,
        lerp_duration_ticks: BORDER_LERP_TICKS,
    }
}

fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}
