//! # Mnema Core
//!
//! Flashcard study engine: spaced-repetition scheduling, study-session
//! queues, and study-log aggregation for the activity heatmap.
//!
//! - **Scheduler**: Anki-style SM-2 variant with minute-scale learning steps,
//!   an ease factor floored at 1.3, and a ±5% interval fuzz to keep cards
//!   from bunching up on the same day
//! - **Session queue**: ordered FIFO of due card ids for one sitting, with
//!   lapsed (Again) cards re-queued at the tail
//! - **Study log**: per-user, per-day review counters with an atomic
//!   increment, heatmap-ready read-back
//! - **Storage**: SQLite-backed decks, cards, and logs
//!
//! The scheduling engine is a pure function and the single canonical
//! implementation: the interactive session path and the server-side review
//! path both go through [`compute_next_review`], so the two can never drift.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mnema_core::{NewCardInput, Rating, SessionQueue, Storage, ThreadRngFuzz};
//! use chrono::Utc;
//!
//! // Create storage (uses default platform-specific location)
//! let storage = Storage::new(None)?;
//!
//! // Seed a deck
//! let deck = storage.create_deck("user-1", "French")?;
//! storage.add_card(&deck.id, NewCardInput {
//!     front: "bonjour".into(),
//!     back: "hello".into(),
//!     ..Default::default()
//! })?;
//!
//! // Run a study session
//! let now = Utc::now();
//! let settings = storage.deck_settings(&deck.id)?;
//! let mut queue = SessionQueue::initialize(&storage.due_cards(&deck.id, now)?, now);
//! let mut fuzz = ThreadRngFuzz;
//! while let Some(card_id) = queue.current().map(str::to_string) {
//!     queue.submit_rating(&storage, &card_id, Rating::Good, &settings, Utc::now(), &mut fuzz)?;
//!     storage.record_study_event("user-1", Utc::now().date_naive())?;
//! }
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod deck;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Scheduling engine
pub use scheduler::{
    compute_next_review,
    // Core constants for advanced usage
    DEFAULT_EASE,
    MIN_EASE,
    DeckSettings,
    DeckSettingsPatch,
    FixedFuzz,
    FuzzSource,
    LifecycleState,
    Rating,
    SchedulerError,
    SchedulingState,
    ThreadRngFuzz,
};

// Session queue
pub use session::{CardStore, SessionError, SessionPhase, SessionQueue};

// Deck read-model
pub use deck::{Card, Deck, NewCardInput};

// Study log
pub use stats::{study_date, StudyLogEntry};

// Storage layer
pub use storage::{Result, Storage, StorageError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        compute_next_review, Card, CardStore, Deck, DeckSettings, FixedFuzz, FuzzSource,
        LifecycleState, NewCardInput, Rating, Result, SchedulingState, SessionPhase, SessionQueue,
        Storage, StorageError, StudyLogEntry, ThreadRngFuzz,
    };
}
