//! Test fixtures

mod fixtures;

pub use fixtures::seed_deck;
