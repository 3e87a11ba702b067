//! Due-set selection and aggregate review statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ReviewState;

/// Aggregate numbers over a collection of review states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub due_now: usize,
    pub total: usize,
    /// Mean ease factor, 0.0 for an empty collection.
    pub average_ease_factor: f64,
}

/// States due at `now`, earliest `next_review_at` first.
///
/// Items due at the same instant keep their input order.
pub fn select_due<'a, I>(states: I, now: DateTime<Utc>) -> Vec<&'a ReviewState>
where
    I: IntoIterator<Item = &'a ReviewState>,
{
    let mut due: Vec<&ReviewState> = states.into_iter().filter(|s| s.is_due(now)).collect();
    due.sort_by_key(|s| s.next_review_at);
    due
}

/// Compute review statistics at `now`.
pub fn review_stats<'a, I>(states: I, now: DateTime<Utc>) -> ReviewStats
where
    I: IntoIterator<Item = &'a ReviewState>,
{
    let (due_now, total, ease_sum) = states
        .into_iter()
        .fold((0usize, 0usize, 0.0), |(due, total, sum), s| {
            (due + usize::from(s.is_due(now)), total + 1, sum + s.ease_factor)
        });

    let average_ease_factor = if total == 0 {
        0.0
    } else {
        ease_sum / total as f64
    };

    ReviewStats {
        due_now,
        total,
        average_ease_factor,
    }
}
