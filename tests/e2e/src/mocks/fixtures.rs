//! Seed data for journey tests

use mnema_core::{Deck, NewCardInput, Storage};

/// Create a deck for `user_id` and fill it with one card per front/back pair.
/// Every card starts due immediately at learning step 0.
pub fn seed_deck(storage: &Storage, user_id: &str, name: &str, pairs: &[(&str, &str)]) -> Deck {
    let deck = storage
        .create_deck(user_id, name)
        .expect("Failed to create deck");

    for (front, back) in pairs {
        storage
            .add_card(
                &deck.id,
                NewCardInput {
                    front: front.to_string(),
                    back: back.to_string(),
                    ..Default::default()
                },
            )
            .expect("Failed to add card");
    }

    storage
        .get_deck(&deck.id)
        .expect("Failed to re-read deck")
        .expect("Seeded deck missing")
}
