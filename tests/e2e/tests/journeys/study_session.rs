//! Full study-session journey: seed a deck, drain the queue with a lapse,
//! and check that card states and the study log come out right.

use chrono::Utc;
use mnema_core::{
    study_date, FixedFuzz, LifecycleState, Rating, SessionPhase, SessionQueue,
};
use mnema_e2e_tests::harness::TestDatabaseManager;
use mnema_e2e_tests::mocks::seed_deck;

#[test]
fn study_session_with_lapse() {
    let db = TestDatabaseManager::new_temp();
    let storage = &db.storage;
    let user_id = "learner-1";

    let deck = seed_deck(
        storage,
        user_id,
        "French basics",
        &[("bonjour", "hello"), ("merci", "thank you"), ("chat", "cat")],
    );
    assert_eq!(deck.cards.len(), 3);

    let now = Utc::now();
    let settings = storage.deck_settings(&deck.id).unwrap();
    let due = storage.due_cards(&deck.id, now).unwrap();
    assert_eq!(due.len(), 3);

    let mut queue = SessionQueue::initialize(&due, now);
    assert_eq!(queue.phase(), SessionPhase::Active);

    let mut fuzz = FixedFuzz(1.0);

    // First card is forgotten: it must come back around in this session
    let lapsed_id = queue.current().unwrap().to_string();
    queue
        .submit_rating(storage, &lapsed_id, Rating::Again, &settings, now, &mut fuzz)
        .unwrap();
    storage.record_study_event(user_id, study_date(now)).unwrap();
    assert_eq!(queue.len(), 3);

    // The remaining two go well
    for _ in 0..2 {
        let id = queue.current().unwrap().to_string();
        queue
            .submit_rating(storage, &id, Rating::Good, &settings, now, &mut fuzz)
            .unwrap();
        storage.record_study_event(user_id, study_date(now)).unwrap();
    }

    // The lapsed card is the only one left, retried at the tail
    assert_eq!(queue.current(), Some(lapsed_id.as_str()));
    let state = queue
        .submit_rating(storage, &lapsed_id, Rating::Good, &settings, now, &mut fuzz)
        .unwrap();
    storage.record_study_event(user_id, study_date(now)).unwrap();

    assert_eq!(queue.phase(), SessionPhase::Finished);
    assert_eq!(queue.current(), None);

    // The lapse reset it to step 0, so Good moved it to step 1
    assert_eq!(state.lifecycle, LifecycleState::Learning);
    assert_eq!(state.step_index, 1);

    // All states were persisted; nothing in the deck is due immediately
    let due_after = storage.due_cards(&deck.id, now).unwrap();
    assert!(due_after.is_empty());

    // Four reviews landed in today's study-log bucket
    let log = storage.query_study_log(user_id).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].date, study_date(now));
    assert_eq!(log[0].count, 4);
}

#[test]
fn settings_update_applies_to_next_review() {
    let db = TestDatabaseManager::new_temp();
    let storage = &db.storage;

    let deck = seed_deck(storage, "learner-1", "Solo", &[("un", "one")]);
    let card_id = deck.cards[0].id.clone();
    let now = Utc::now();
    let mut fuzz = FixedFuzz(1.0);

    // Easy-graduate under patched settings: the new easy interval wins
    let patch = serde_json::from_str(r#"{"easyIntervalDays": 8.0}"#).unwrap();
    storage.update_deck_settings(&deck.id, &patch).unwrap();
    let settings = storage.deck_settings(&deck.id).unwrap();

    let due = storage.due_cards(&deck.id, now).unwrap();
    let mut queue = SessionQueue::initialize(&due, now);
    let state = queue
        .submit_rating(storage, &card_id, Rating::Easy, &settings, now, &mut fuzz)
        .unwrap();

    assert_eq!(state.lifecycle, LifecycleState::Graduated);
    assert!(state.interval_days >= 8.0 * 0.95 && state.interval_days < 8.0 * 1.05);
}

#[test]
fn server_side_review_path_matches_session_semantics() {
    let db = TestDatabaseManager::new_temp();
    let storage = &db.storage;
    let user_id = "learner-1";

    let deck = seed_deck(storage, user_id, "Solo", &[("un", "one")]);
    let card_id = deck.cards[0].id.clone();
    let now = Utc::now();

    let state = storage
        .review_card(user_id, &deck.id, &card_id, Rating::Good, now, &mut FixedFuzz(1.0))
        .unwrap();

    // Same engine as the interactive path: step advanced, 10 minutes out
    assert_eq!(state.step_index, 1);
    assert_eq!((state.due_date - now).num_minutes(), 10);

    // And the study log was bumped as part of the review
    let log = storage.query_study_log(user_id).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].count, 1);
}
