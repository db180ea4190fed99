//! Study Log Aggregation
//!
//! One counter per `(user, calendar day)` bucket, feeding the activity
//! heatmap. Buckets are created implicitly on the first review of a day and
//! only ever incremented; the increment itself is a single atomic SQL
//! statement in the storage layer so concurrent reviews (same user, two
//! devices) never lose counts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One day of review activity for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyLogEntry {
    /// Owning user
    pub user_id: String,
    /// Calendar day (UTC)
    pub date: NaiveDate,
    /// Reviews recorded that day
    pub count: i64,
}

/// Calendar-day bucket for a review timestamp.
///
/// The heatmap granularity is one UTC day; all reviews within it share a
/// bucket.
pub fn study_date(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}
