//! SQLite Storage Implementation
//!
//! Persistence for decks, cards, and the per-user study log. Uses separate
//! reader/writer connections behind mutexes so all methods take `&self` and
//! `Storage` stays `Send + Sync`.

use chrono::{DateTime, NaiveDate, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::deck::{Card, Deck, NewCardInput};
use crate::scheduler::{
    compute_next_review, interval_duration, DeckSettings, DeckSettingsPatch, FuzzSource,
    LifecycleState, Rating, SchedulingState,
};
use crate::session::CardStore;
use crate::stats::{study_date, StudyLogEntry};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Deck not found
    #[error("Deck not found: {0}")]
    DeckNotFound(String),
    /// Card not found
    #[error("Card not found: {0}")]
    CardNotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// Card columns in the order row_to_card reads them
const CARD_COLUMNS: &str = "id, front, back, front_image, back_image, \
     interval_days, ease, repetitions, lifecycle, step_index, due_date, \
     created_at, updated_at";

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite-backed store for decks, cards, and study logs
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl Storage {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Create new storage instance.
    ///
    /// With no explicit path the database lands in the platform data
    /// directory.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "mnema", "core").ok_or_else(|| {
                    StorageError::Init("Could not determine project directories".to_string())
                })?;

                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                data_dir.join("mnema.db")
            }
        };

        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    // ========================================================================
    // DECKS
    // ========================================================================

    /// Create a new, empty deck with default settings
    pub fn create_deck(&self, user_id: &str, name: &str) -> Result<Deck> {
        let now = Utc::now();
        let deck = Deck::new(user_id, name, now);
        let settings_json =
            serde_json::to_string(&deck.settings).unwrap_or_else(|_| "{}".to_string());

        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        writer.execute(
            "INSERT INTO decks (id, user_id, name, created_at, settings)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![deck.id, deck.user_id, deck.name, now.to_rfc3339(), settings_json],
        )?;

        tracing::info!(deck_id = %deck.id, user_id, "Deck created");
        Ok(deck)
    }

    /// Fetch a deck with all of its cards
    pub fn get_deck(&self, deck_id: &str) -> Result<Option<Deck>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;

        let deck = reader
            .query_row(
                "SELECT id, user_id, name, created_at, settings FROM decks WHERE id = ?1",
                params![deck_id],
                Self::row_to_deck,
            )
            .optional()?;

        let Some(mut deck) = deck else {
            return Ok(None);
        };

        let mut stmt = reader.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE deck_id = ?1 ORDER BY created_at ASC, id ASC"
        ))?;
        let cards = stmt.query_map(params![deck_id], Self::row_to_card)?;
        for card in cards {
            deck.cards.push(card?);
        }

        Ok(Some(deck))
    }

    /// All decks (with cards) owned by a user
    pub fn list_decks(&self, user_id: &str) -> Result<Vec<Deck>> {
        let ids: Vec<String> = {
            let reader = self
                .reader
                .lock()
                .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
            let mut stmt = reader.prepare(
                "SELECT id FROM decks WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        let mut decks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(deck) = self.get_deck(&id)? {
                decks.push(deck);
            }
        }
        Ok(decks)
    }

    /// Delete a deck; its cards go with it. Returns whether a deck existed.
    pub fn delete_deck(&self, deck_id: &str) -> Result<bool> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        let deleted = writer.execute("DELETE FROM decks WHERE id = ?1", params![deck_id])?;

        if deleted > 0 {
            tracing::info!(deck_id, "Deck deleted");
        }
        Ok(deleted > 0)
    }

    /// Scheduling settings for a deck, with missing fields resolved to
    /// defaults
    pub fn deck_settings(&self, deck_id: &str) -> Result<DeckSettings> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;

        let json: Option<String> = reader
            .query_row(
                "SELECT settings FROM decks WHERE id = ?1",
                params![deck_id],
                |row| row.get(0),
            )
            .optional()?;

        let json = json.ok_or_else(|| StorageError::DeckNotFound(deck_id.to_string()))?;
        Ok(serde_json::from_str(&json).unwrap_or_default())
    }

    /// Merge a settings patch into a deck's stored settings and return the
    /// result. Only the provided fields change.
    pub fn update_deck_settings(
        &self,
        deck_id: &str,
        patch: &DeckSettingsPatch,
    ) -> Result<DeckSettings> {
        let mut settings = self.deck_settings(deck_id)?;
        patch.apply(&mut settings);

        let json = serde_json::to_string(&settings).unwrap_or_else(|_| "{}".to_string());
        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        writer.execute(
            "UPDATE decks SET settings = ?1 WHERE id = ?2",
            params![json, deck_id],
        )?;

        tracing::info!(deck_id, "Deck settings updated");
        Ok(settings)
    }

    // ========================================================================
    // CARDS
    // ========================================================================

    /// Add a card to a deck, due immediately at learning step 0
    pub fn add_card(&self, deck_id: &str, input: NewCardInput) -> Result<Card> {
        let now = Utc::now();
        let card = Card::new(input, now);

        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;

        let deck_exists: Option<String> = writer
            .query_row(
                "SELECT id FROM decks WHERE id = ?1",
                params![deck_id],
                |row| row.get(0),
            )
            .optional()?;
        if deck_exists.is_none() {
            return Err(StorageError::DeckNotFound(deck_id.to_string()));
        }

        writer.execute(
            "INSERT INTO cards (
                id, deck_id, front, back, front_image, back_image,
                interval_days, ease, repetitions, lifecycle, step_index, due_date,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                card.id,
                deck_id,
                card.front,
                card.back,
                card.front_image,
                card.back_image,
                card.scheduling.interval_days,
                card.scheduling.ease,
                card.scheduling.repetitions as i64,
                card.scheduling.lifecycle.as_str(),
                card.scheduling.step_index as i64,
                card.scheduling.due_date.to_rfc3339(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(card)
    }

    /// Fetch a single card
    pub fn get_card(&self, card_id: &str) -> Result<Option<Card>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;

        let card = reader
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
                params![card_id],
                Self::row_to_card,
            )
            .optional()?;
        Ok(card)
    }

    /// Ids and due dates of a deck's cards that are due at `now`, ordered
    /// ascending by due date with the card id as a stable tie-break.
    pub fn due_cards(
        &self,
        deck_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<(String, DateTime<Utc>)>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;

        let mut stmt = reader.prepare(
            "SELECT id, due_date FROM cards
             WHERE deck_id = ?1 AND due_date <= ?2
             ORDER BY due_date ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![deck_id, now.to_rfc3339()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, DateTime<Utc>>(1)?))
        })?;

        let mut due = Vec::new();
        for row in rows {
            due.push(row?);
        }
        Ok(due)
    }

    // ========================================================================
    // REVIEWS
    // ========================================================================

    /// Server-side review path: run the scheduling engine for one card,
    /// persist the new state, and bump the user's study log for the day.
    ///
    /// The interactive session path composes the same pieces itself through
    /// [`SessionQueue`](crate::session::SessionQueue); both run the one
    /// canonical engine.
    pub fn review_card(
        &self,
        user_id: &str,
        deck_id: &str,
        card_id: &str,
        rating: Rating,
        now: DateTime<Utc>,
        fuzz: &mut dyn FuzzSource,
    ) -> Result<SchedulingState> {
        let settings = self.deck_settings(deck_id)?;
        let state = self.scheduling_state(card_id)?;

        let next = compute_next_review(&state, rating, &settings, now, fuzz);
        self.save_scheduling_state(card_id, &next)?;
        self.record_study_event(user_id, study_date(now))?;

        Ok(next)
    }

    // ========================================================================
    // STUDY LOG
    // ========================================================================

    /// Count one review for `(user, day)` and return the new count.
    ///
    /// Single atomic upsert-and-increment: concurrent reviews for the same
    /// user and day contend inside SQLite, not in a read-modify-write race.
    pub fn record_study_event(&self, user_id: &str, date: NaiveDate) -> Result<i64> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;

        let count = writer.query_row(
            "INSERT INTO study_log (user_id, date, count) VALUES (?1, ?2, 1)
             ON CONFLICT(user_id, date) DO UPDATE SET count = count + 1
             RETURNING count",
            params![user_id, date.format("%Y-%m-%d").to_string()],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// A user's study log, one entry per day with activity, ordered
    /// ascending by date. Heatmap-ready.
    pub fn query_study_log(&self, user_id: &str) -> Result<Vec<StudyLogEntry>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;

        let mut stmt = reader.prepare(
            "SELECT user_id, date, count FROM study_log
             WHERE user_id = ?1 ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(StudyLogEntry {
                user_id: row.get(0)?,
                date: row.get(1)?,
                count: row.get(2)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    fn row_to_deck(row: &rusqlite::Row<'_>) -> rusqlite::Result<Deck> {
        let settings_json: String = row.get(4)?;
        Ok(Deck {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            created_at: row.get(3)?,
            settings: serde_json::from_str(&settings_json).unwrap_or_default(),
            cards: vec![],
        })
    }

    fn row_to_card(row: &rusqlite::Row<'_>) -> rusqlite::Result<Card> {
        let lifecycle: String = row.get(8)?;
        Ok(Card {
            id: row.get(0)?,
            front: row.get(1)?,
            back: row.get(2)?,
            front_image: row.get(3)?,
            back_image: row.get(4)?,
            scheduling: SchedulingState {
                interval_days: row.get(5)?,
                ease: row.get(6)?,
                repetitions: row.get::<_, i64>(7)? as u32,
                lifecycle: LifecycleState::parse_name(&lifecycle),
                step_index: row.get::<_, i64>(9)? as usize,
                due_date: row.get(10)?,
            },
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}

// ============================================================================
// CARD STORE
// ============================================================================

impl CardStore for Storage {
    fn scheduling_state(&self, card_id: &str) -> Result<SchedulingState> {
        self.get_card(card_id)?
            .map(|card| card.scheduling)
            .ok_or_else(|| StorageError::CardNotFound(card_id.to_string()))
    }

    fn save_scheduling_state(&self, card_id: &str, state: &SchedulingState) -> Result<()> {
        // The review instant is recoverable from the computed state:
        // due_date = review time + interval.
        let review_time = state.due_date - interval_duration(state.interval_days);

        let stored_due: Option<DateTime<Utc>> = {
            let reader = self
                .reader
                .lock()
                .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
            reader
                .query_row(
                    "SELECT due_date FROM cards WHERE id = ?1",
                    params![card_id],
                    |row| row.get(0),
                )
                .optional()?
        };
        let stored_due = stored_due.ok_or_else(|| StorageError::CardNotFound(card_id.to_string()))?;

        // A stored due date after the review instant means this state was
        // computed from a stale snapshot - another device reviewed the card
        // first. Last write wins, but loudly.
        if stored_due > review_time + chrono::Duration::seconds(1) {
            tracing::warn!(
                card_id,
                stored_due = %stored_due,
                review_time = %review_time,
                "Overwriting scheduling state written by a newer review (last-write-wins)"
            );
        }

        let now = Utc::now();
        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        let updated = writer.execute(
            "UPDATE cards SET
                interval_days = ?1,
                ease = ?2,
                repetitions = ?3,
                lifecycle = ?4,
                step_index = ?5,
                due_date = ?6,
                updated_at = ?7
            WHERE id = ?8",
            params![
                state.interval_days,
                state.ease,
                state.repetitions as i64,
                state.lifecycle.as_str(),
                state.step_index as i64,
                state.due_date.to_rfc3339(),
                now.to_rfc3339(),
                card_id,
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::CardNotFound(card_id.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
