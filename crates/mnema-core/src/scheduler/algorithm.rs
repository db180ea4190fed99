//! Scheduling Constants and Interval Math
//!
//! Pure helpers shared by the engine. Everything here is stateless; the
//! engine in `engine.rs` composes these into the per-rating transition.

use chrono::Duration;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Ease factor floor. No rating sequence may push ease below this.
pub const MIN_EASE: f64 = 1.3;

/// Ease factor assigned to brand-new cards
pub const DEFAULT_EASE: f64 = 2.5;

/// Ease penalty applied on a lapse (Again)
pub const AGAIN_EASE_PENALTY: f64 = 0.2;

/// Ease penalty applied on Hard for a graduated card
pub const HARD_EASE_PENALTY: f64 = 0.15;

/// Interval multiplier for Hard on a graduated card
pub const HARD_INTERVAL_MULTIPLIER: f64 = 1.2;

/// Extra interval multiplier on Easy for a graduated card
pub const EASY_INTERVAL_BONUS: f64 = 1.3;

/// Ease reward on Easy for a graduated card
pub const EASY_EASE_REWARD: f64 = 0.15;

/// Intervals longer than this many days get fuzzed
pub const FUZZ_THRESHOLD_DAYS: f64 = 2.0;

/// Lower bound of the fuzz multiplier (inclusive)
pub const FUZZ_MIN: f64 = 0.95;

/// Upper bound of the fuzz multiplier (exclusive)
pub const FUZZ_MAX: f64 = 1.05;

/// Minutes per day, for converting learning steps to day-scale intervals
pub const MINUTES_PER_DAY: f64 = 1440.0;

// ============================================================================
// HELPERS
// ============================================================================

/// Clamp an ease factor to the 1.3 floor
pub fn clamp_ease(ease: f64) -> f64 {
    ease.max(MIN_EASE)
}

/// Convert a minute-scale learning step into a fractional-day interval
pub fn step_interval_days(minutes: u32) -> f64 {
    minutes as f64 / MINUTES_PER_DAY
}

/// Convert a fractional-day interval into a chrono duration.
///
/// Millisecond precision is plenty: the shortest interval the engine
/// produces is a one-minute learning step.
pub fn interval_duration(interval_days: f64) -> Duration {
    Duration::milliseconds((interval_days * 86_400_000.0).round() as i64)
}
