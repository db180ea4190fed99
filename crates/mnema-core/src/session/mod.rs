//! Study Session Queue
//!
//! Builds and drains an ordered queue of due card ids for one study session.
//!
//! The queue is ephemeral and single-owner: one session controller mutates one
//! queue, and the queue is discarded when the session ends or is abandoned.
//! Cards rated Again are re-queued at the tail so a lapsed card is retried
//! later in the same session; any other rating removes the card from the
//! session for good (it may still come due again in a future session).
//!
//! Re-queuing only on Again bounds session length while still forcing
//! immediate re-drill of forgotten material. The queue stays FIFO rather than
//! re-sorting by new due date, so just-reviewed cards never jump ahead of
//! others still waiting.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::scheduler::{compute_next_review, DeckSettings, FuzzSource, Rating, SchedulingState};
use crate::storage::StorageError;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Session queue error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Submitted card id does not match the queue head. The session
    /// controller should re-sync from [`SessionQueue::current`].
    #[error("Out-of-order submission: expected {expected:?}, got {got}")]
    OutOfOrderSubmission {
        /// Current queue head, `None` when the session is not active
        expected: Option<String>,
        /// The id the caller submitted
        got: String,
    },
    /// Card store failure, propagated unchanged
    #[error(transparent)]
    Store(#[from] StorageError),
}

// ============================================================================
// CARD STORE SEAM
// ============================================================================

/// Persistence collaborator for card scheduling state.
///
/// The queue manager computes new states but never owns their persistence;
/// the storage layer (or a test double) implements this.
pub trait CardStore {
    /// Current persisted scheduling state for a card
    fn scheduling_state(&self, card_id: &str) -> Result<SchedulingState, StorageError>;

    /// Persist a freshly computed scheduling state for a card
    fn save_scheduling_state(
        &self,
        card_id: &str,
        state: &SchedulingState,
    ) -> Result<(), StorageError>;
}

// ============================================================================
// SESSION QUEUE
// ============================================================================

/// Session lifecycle: `Uninitialized -> Active -> Finished`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Created but not yet populated with due cards
    #[default]
    Uninitialized,
    /// Draining the queue
    Active,
    /// Queue empty; terminal
    Finished,
}

/// Ordered queue of due card ids for one study session
#[derive(Debug, Default)]
pub struct SessionQueue {
    queue: VecDeque<String>,
    phase: SessionPhase,
}

impl SessionQueue {
    /// Create an empty, uninitialized queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the session queue from a deck snapshot of `(card id, due date)`
    /// pairs.
    ///
    /// Cards with `due_date <= now` enter the queue sorted ascending by due
    /// date, earliest first, with the card id as a stable tie-break so
    /// ordering is deterministic. Goes straight to `Finished` when nothing
    /// is due.
    pub fn initialize(due_cards: &[(String, DateTime<Utc>)], now: DateTime<Utc>) -> Self {
        let mut due: Vec<&(String, DateTime<Utc>)> = due_cards
            .iter()
            .filter(|(_, due_date)| *due_date <= now)
            .collect();
        due.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let queue: VecDeque<String> = due.into_iter().map(|(id, _)| id.clone()).collect();
        let phase = if queue.is_empty() {
            SessionPhase::Finished
        } else {
            SessionPhase::Active
        };

        Self { queue, phase }
    }

    /// Current session phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Number of cards left in the session
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Head of the queue, or `None` when the session is finished (or was
    /// never initialized). Reading does not mutate state.
    pub fn current(&self) -> Option<&str> {
        match self.phase {
            SessionPhase::Active => self.queue.front().map(String::as_str),
            _ => None,
        }
    }

    /// Submit a rating for the card at the head of the queue.
    ///
    /// `card_id` must equal the current head; anything else fails with
    /// [`SessionError::OutOfOrderSubmission`] (defends against stale UI
    /// state). On success the new scheduling state has already been handed
    /// to the card store, the head is popped, and an Again rating re-queues
    /// the same id at the tail.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_rating(
        &mut self,
        store: &dyn CardStore,
        card_id: &str,
        rating: Rating,
        settings: &DeckSettings,
        now: DateTime<Utc>,
        fuzz: &mut dyn FuzzSource,
    ) -> Result<SchedulingState, SessionError> {
        match self.current() {
            Some(head) if head == card_id => {}
            other => {
                return Err(SessionError::OutOfOrderSubmission {
                    expected: other.map(str::to_string),
                    got: card_id.to_string(),
                });
            }
        }

        let state = store.scheduling_state(card_id)?;
        let next = compute_next_review(&state, rating, settings, now, fuzz);
        store.save_scheduling_state(card_id, &next)?;

        // Pop only after persistence succeeded, so a failed write leaves the
        // session able to retry the same card.
        let id = self.queue.pop_front().unwrap_or_else(|| card_id.to_string());
        if rating == Rating::Again {
            self.queue.push_back(id);
        }

        if self.queue.is_empty() {
            self.phase = SessionPhase::Finished;
        }

        Ok(next)
    }
}

// ============================================================================
// TESTS
// ============================================================================
