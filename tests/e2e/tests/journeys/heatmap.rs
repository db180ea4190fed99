//! Heatmap journey: study-log buckets across days and users.

use chrono::{Duration, Utc};
use mnema_core::study_date;
use mnema_e2e_tests::harness::TestDatabaseManager;

#[test]
fn heatmap_read_back_is_ordered_and_per_user() {
    let db = TestDatabaseManager::new_temp();
    let storage = &db.storage;

    let today = study_date(Utc::now());
    let two_days_ago = study_date(Utc::now() - Duration::days(2));
    let last_week = study_date(Utc::now() - Duration::days(7));

    // Reviews arrive out of date order
    storage.record_study_event("ana", today).unwrap();
    storage.record_study_event("ana", last_week).unwrap();
    storage.record_study_event("ana", today).unwrap();
    storage.record_study_event("ana", two_days_ago).unwrap();
    storage.record_study_event("ben", today).unwrap();

    let log = storage.query_study_log("ana").unwrap();
    let dates: Vec<_> = log.iter().map(|e| e.date).collect();
    assert_eq!(dates, vec![last_week, two_days_ago, today]);

    let counts: Vec<_> = log.iter().map(|e| e.count).collect();
    assert_eq!(counts, vec![1, 1, 2]);

    // Ben's activity never leaks into Ana's heatmap
    let ben = storage.query_study_log("ben").unwrap();
    assert_eq!(ben.len(), 1);
    assert_eq!(ben[0].count, 1);
}

#[test]
fn bucket_created_implicitly_and_only_incremented() {
    let db = TestDatabaseManager::new_temp();
    let storage = &db.storage;
    let today = study_date(Utc::now());

    // First review of the day creates the bucket at 1
    assert_eq!(storage.record_study_event("ana", today).unwrap(), 1);

    // Counts are monotonically increasing
    let mut last = 1;
    for _ in 0..10 {
        let count = storage.record_study_event("ana", today).unwrap();
        assert_eq!(count, last + 1);
        last = count;
    }
}
