//! Storage Module
//!
//! SQLite-based persistence for decks, cards, and the per-user study log,
//! with versioned schema migrations.

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{Result, Storage, StorageError};
