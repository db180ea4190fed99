//! Scheduling Engine
//!
//! The pure per-card transition: `(state, rating, settings, now, fuzz)` in,
//! new state out. No I/O, no hidden state — safe to call concurrently for
//! distinct cards, and the single canonical implementation used by both the
//! interactive session path and any server-side recomputation.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::algorithm::{
    clamp_ease, interval_duration, step_interval_days, AGAIN_EASE_PENALTY, DEFAULT_EASE,
    EASY_EASE_REWARD, EASY_INTERVAL_BONUS, FUZZ_MAX, FUZZ_MIN, FUZZ_THRESHOLD_DAYS,
    HARD_EASE_PENALTY, HARD_INTERVAL_MULTIPLIER,
};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Scheduling engine error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// Rating ordinal outside 1..=4. Rejected, never clamped.
    #[error("Invalid rating: {0} (expected 1=Again, 2=Hard, 3=Good, 4=Easy)")]
    InvalidRating(u8),
}

// ============================================================================
// RATING
// ============================================================================

/// User rating for a single card review (ordinals 1-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Rating {
    /// Forgot the card - immediate repeat
    Again = 1,
    /// Recalled with serious difficulty
    Hard = 2,
    /// Recalled correctly
    Good = 3,
    /// Recalled effortlessly
    Easy = 4,
}

impl Rating {
    /// Ordinal value (1-4) as stored/transmitted by callers
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for Rating {
    type Error = SchedulerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(SchedulerError::InvalidRating(other)),
        }
    }
}

// ============================================================================
// LIFECYCLE STATE
// ============================================================================

/// Card lifecycle: minute-scale learning steps vs day-scale ease growth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Working through the deck's learning steps
    #[default]
    Learning,
    /// Graduated to day-scale intervals driven by the ease factor
    Graduated,
}

impl LifecycleState {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Learning => "learning",
            LifecycleState::Graduated => "graduated",
        }
    }

    /// Parse from string name
    pub fn parse_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "graduated" => LifecycleState::Graduated,
            _ => LifecycleState::Learning,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SCHEDULING STATE
// ============================================================================

/// Per-card scheduling state
///
/// Created with defaults when a card is created, mutated only by
/// [`compute_next_review`], and persisted alongside its card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    /// Current interval in days (fractional while in learning steps)
    pub interval_days: f64,
    /// Ease factor - growth multiplier for graduated intervals, floor 1.3
    pub ease: f64,
    /// Consecutive successful reviews (Good/Easy only; reset on Again)
    pub repetitions: u32,
    /// Learning vs graduated
    pub lifecycle: LifecycleState,
    /// Index into the deck's learning steps while in `Learning`
    pub step_index: usize,
    /// When the card next becomes eligible for review
    pub due_date: DateTime<Utc>,
}

impl SchedulingState {
    /// State for a freshly created card: due now, at step 0
    pub fn new_card(now: DateTime<Utc>) -> Self {
        Self {
            interval_days: 0.0,
            ease: DEFAULT_EASE,
            repetitions: 0,
            lifecycle: LifecycleState::Learning,
            step_index: 0,
            due_date: now,
        }
    }

    /// Whether the card is eligible for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_date <= now
    }
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self::new_card(Utc::now())
    }
}

// ============================================================================
// DECK SETTINGS
// ============================================================================

/// Per-deck scheduling configuration, shared read-only by all of the deck's
/// cards during scheduling.
///
/// Every recognized option has a documented default; a missing or partial
/// settings object is resolved via [`Default`] and serde field defaults,
/// never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSettings {
    /// Minute offsets for learning steps, in order (default `[1, 10]`)
    #[serde(default = "default_learning_steps")]
    pub learning_steps: Vec<u32>,
    /// Days awarded on normal graduation (default 1)
    #[serde(default = "default_graduating_interval")]
    pub graduating_interval_days: f64,
    /// Days awarded on immediate-Easy graduation (default 4)
    #[serde(default = "default_easy_interval")]
    pub easy_interval_days: f64,
}

fn default_learning_steps() -> Vec<u32> {
    vec![1, 10]
}

fn default_graduating_interval() -> f64 {
    1.0
}

fn default_easy_interval() -> f64 {
    4.0
}

impl Default for DeckSettings {
    fn default() -> Self {
        Self {
            learning_steps: default_learning_steps(),
            graduating_interval_days: default_graduating_interval(),
            easy_interval_days: default_easy_interval(),
        }
    }
}

/// Partial settings update: only the provided fields change.
///
/// Uses `deny_unknown_fields` so a typoed option is rejected instead of
/// silently ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeckSettingsPatch {
    pub learning_steps: Option<Vec<u32>>,
    pub graduating_interval_days: Option<f64>,
    pub easy_interval_days: Option<f64>,
}

impl DeckSettingsPatch {
    /// Merge this patch into existing settings, field by field
    pub fn apply(&self, settings: &mut DeckSettings) {
        if let Some(steps) = &self.learning_steps {
            settings.learning_steps = steps.clone();
        }
        if let Some(days) = self.graduating_interval_days {
            settings.graduating_interval_days = days;
        }
        if let Some(days) = self.easy_interval_days {
            settings.easy_interval_days = days;
        }
    }
}

// ============================================================================
// FUZZ SOURCE
// ============================================================================

/// Injectable source of the interval fuzz multiplier.
///
/// Production wiring uses [`ThreadRngFuzz`]; tests pin the factor with
/// [`FixedFuzz`] for determinism.
pub trait FuzzSource {
    /// A multiplier in `[0.95, 1.05)`
    fn fuzz_factor(&mut self) -> f64;
}

/// Thread-local RNG fuzz source for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngFuzz;

impl FuzzSource for ThreadRngFuzz {
    fn fuzz_factor(&mut self) -> f64 {
        rand::thread_rng().gen_range(FUZZ_MIN..FUZZ_MAX)
    }
}

/// Fixed fuzz source for deterministic tests
#[derive(Debug, Clone, Copy)]
pub struct FixedFuzz(pub f64);

impl FuzzSource for FixedFuzz {
    fn fuzz_factor(&mut self) -> f64 {
        self.0
    }
}

// ============================================================================
// TRANSITION
// ============================================================================

/// Compute the next scheduling state for a card given a user rating.
///
/// Pure and side-effect free. `step_index` is bounds-checked against the
/// settings in effect at call time: settings may change between reviews, and
/// an empty `learning_steps` sequence graduates the card on Good/Hard rather
/// than indexing out of range.
///
/// Intervals over [`FUZZ_THRESHOLD_DAYS`] are multiplied by `fuzz.fuzz_factor()`
/// to spread review load; the resulting due date is `now + interval`.
pub fn compute_next_review(
    state: &SchedulingState,
    rating: Rating,
    settings: &DeckSettings,
    now: DateTime<Utc>,
    fuzz: &mut dyn FuzzSource,
) -> SchedulingState {
    let mut next = state.clone();

    match rating {
        Rating::Again => {
            // Lapse: back to step 0, due immediately
            next.repetitions = 0;
            next.lifecycle = LifecycleState::Learning;
            next.step_index = 0;
            next.interval_days = 0.0;
            next.ease = clamp_ease(state.ease - AGAIN_EASE_PENALTY);
        }
        Rating::Hard => match state.lifecycle {
            LifecycleState::Learning => match settings.learning_steps.get(state.step_index) {
                // Repeat the current step; ease untouched in learning
                Some(&minutes) => next.interval_days = step_interval_days(minutes),
                // Steps emptied or shrank under the card: graduate
                None => {
                    next.lifecycle = LifecycleState::Graduated;
                    next.interval_days = settings.graduating_interval_days;
                }
            },
            LifecycleState::Graduated => {
                next.interval_days = state.interval_days * HARD_INTERVAL_MULTIPLIER;
                next.ease = clamp_ease(state.ease - HARD_EASE_PENALTY);
            }
        },
        Rating::Good => {
            match state.lifecycle {
                LifecycleState::Learning => {
                    if state.step_index + 1 < settings.learning_steps.len() {
                        next.step_index = state.step_index + 1;
                        next.interval_days =
                            step_interval_days(settings.learning_steps[next.step_index]);
                    } else {
                        next.lifecycle = LifecycleState::Graduated;
                        next.interval_days = settings.graduating_interval_days;
                    }
                }
                LifecycleState::Graduated => {
                    next.interval_days = state.interval_days * state.ease;
                }
            }
            next.repetitions = state.repetitions + 1;
        }
        Rating::Easy => {
            match state.lifecycle {
                LifecycleState::Learning => {
                    next.lifecycle = LifecycleState::Graduated;
                    next.interval_days = settings.easy_interval_days;
                }
                LifecycleState::Graduated => {
                    next.interval_days = state.interval_days * state.ease * EASY_INTERVAL_BONUS;
                    next.ease = state.ease + EASY_EASE_REWARD;
                }
            }
            next.repetitions = state.repetitions + 1;
        }
    }

    if next.interval_days > FUZZ_THRESHOLD_DAYS {
        next.interval_days *= fuzz.fuzz_factor();
    }

    next.due_date = now + interval_duration(next.interval_days);
    next
}

// ============================================================================
// TESTS
// ============================================================================
