//! Spaced repetition scheduling.

pub mod sm2;

use crate::error::Result;
use crate::types::{Quality, ReviewState};
use chrono::{DateTime, Utc};

pub use sm2::{compute_next_review, Sm2, MAXIMUM_INTERVAL};

/// Trait for spaced repetition schedulers.
pub trait Scheduler: Send + Sync {
    /// Scheduler identifier.
    fn name(&self) -> &'static str;

    /// State of an item that has never been reviewed.
    fn initial_state(&self, item_id: &str, now: DateTime<Utc>) -> ReviewState;

    /// Calculate the state that replaces `previous` after a review.
    ///
    /// `previous` is `None` on the first review of `item_id`.
    fn schedule(
        &self,
        previous: Option<&ReviewState>,
        item_id: &str,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<ReviewState>;
}

/// Get scheduler by name.
pub fn get_scheduler(name: &str) -> Option<Box<dyn Scheduler>> {
    match name {
        "sm2" => Some(Box::new(Sm2::default())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(get_scheduler("sm2").map(|s| s.name()), Some("sm2"));
        assert!(get_scheduler("fsrs").is_none());
    }
}
