//! Scheduling Engine Module
//!
//! Anki-style SM-2 variant with minute-scale learning steps.
//!
//! A card lives in one of two lifecycle states: `Learning` (short, minute-scale
//! steps before the card is trusted with day-scale intervals) and `Graduated`
//! (interval growth driven by the ease factor, floor 1.3).
//!
//! ## Core rules
//! - Again: full reset to step 0, due immediately, ease -0.2
//! - Hard: repeat the current step / interval x1.2, ease -0.15 (graduated only)
//! - Good: advance a step or graduate / interval x ease
//! - Easy: graduate immediately / interval x ease x 1.3, ease +0.15
//!
//! Intervals over 2 days receive a +/-5% fuzz so cards don't bunch up on the
//! same day. The fuzz source is injected so tests can pin it.

mod algorithm;
mod engine;

pub use algorithm::{
    clamp_ease,
    interval_duration,
    step_interval_days,
    // Constants
    AGAIN_EASE_PENALTY,
    DEFAULT_EASE,
    EASY_EASE_REWARD,
    EASY_INTERVAL_BONUS,
    FUZZ_MAX,
    FUZZ_MIN,
    FUZZ_THRESHOLD_DAYS,
    HARD_EASE_PENALTY,
    HARD_INTERVAL_MULTIPLIER,
    MINUTES_PER_DAY,
    MIN_EASE,
};

pub use engine::{
    compute_next_review, DeckSettings, DeckSettingsPatch, FixedFuzz, FuzzSource, LifecycleState,
    Rating, SchedulerError, SchedulingState, ThreadRngFuzz,
};
