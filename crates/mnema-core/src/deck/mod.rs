//! Deck and Card Read-Model
//!
//! A deck owns its cards and a shared [`DeckSettings`] used by all of them
//! during scheduling. Cards carry front/back text, optional image
//! references (string references only - attachment content lives elsewhere),
//! and their scheduling state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduler::{DeckSettings, SchedulingState};

// ============================================================================
// CARD
// ============================================================================

/// A flashcard: content plus owned scheduling state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Prompt side
    pub front: String,
    /// Answer side
    pub back: String,
    /// Optional image reference for the front
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_image: Option<String>,
    /// Optional image reference for the back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_image: Option<String>,
    /// Scheduling state, mutated only by the scheduling engine
    pub scheduling: SchedulingState,
    /// When the card was created
    pub created_at: DateTime<Utc>,
    /// When the card was last modified
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Create a new card due immediately, at learning step 0
    pub fn new(input: NewCardInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            front: input.front,
            back: input.back,
            front_image: input.front_image,
            back_image: input.back_image,
            scheduling: SchedulingState::new_card(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the card is eligible for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduling.is_due(now)
    }
}

/// Input for creating a new card.
///
/// Uses `deny_unknown_fields` to reject malformed client payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCardInput {
    /// Prompt side
    pub front: String,
    /// Answer side
    pub back: String,
    /// Optional image reference for the front
    #[serde(default)]
    pub front_image: Option<String>,
    /// Optional image reference for the back
    #[serde(default)]
    pub back_image: Option<String>,
}

// ============================================================================
// DECK
// ============================================================================

/// A deck of cards owned by one user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Display name
    pub name: String,
    /// When the deck was created
    pub created_at: DateTime<Utc>,
    /// Scheduling configuration shared by all cards in the deck
    pub settings: DeckSettings,
    /// The deck's cards
    pub cards: Vec<Card>,
}

impl Deck {
    /// Create an empty deck with default settings
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: name.into(),
            created_at: now,
            settings: DeckSettings::default(),
            cards: vec![],
        }
    }

    /// Snapshot of `(card id, due date)` pairs for session-queue
    /// initialization
    pub fn due_snapshot(&self) -> Vec<(String, DateTime<Utc>)> {
        self.cards
            .iter()
            .map(|card| (card.id.clone(), card.scheduling.due_date))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
