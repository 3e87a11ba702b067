//! SM-2 spaced repetition algorithm.
//!
//! A four-level variant of SuperMemo 2. Ratings below Good (Again and
//! Hard) reset the item to a one-day interval.

use super::Scheduler;
use crate::error::{Error, Result};
use crate::types::{Quality, ReviewState, INITIAL_EASE, MINIMUM_EASE};
use chrono::{DateTime, Duration, Utc};

/// Longest interval ever scheduled, in days (about a hundred years).
pub const MAXIMUM_INTERVAL: u32 = 36_500;

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Interval after the first successful review.
    pub first_interval: u32,
    /// Interval after the second consecutive successful review.
    pub second_interval: u32,
    /// Upper bound of every interval. Growth past it is clamped.
    pub maximum_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: INITIAL_EASE,
            minimum_ease: MINIMUM_EASE,
            first_interval: 1,
            second_interval: 6,
            maximum_interval: MAXIMUM_INTERVAL,
        }
    }
}

/// Schedule `item_id` with the default SM-2 parameters.
pub fn compute_next_review(
    previous: Option<&ReviewState>,
    item_id: &str,
    quality: Quality,
    now: DateTime<Utc>,
) -> Result<ReviewState> {
    Sm2::default().schedule(previous, item_id, quality, now)
}

impl Scheduler for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self, item_id: &str, now: DateTime<Utc>) -> ReviewState {
        ReviewState {
            ease_factor: self.initial_ease,
            ..ReviewState::initial(item_id, now)
        }
    }

    fn schedule(
        &self,
        previous: Option<&ReviewState>,
        item_id: &str,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<ReviewState> {
        let previous = match previous {
            Some(state) => {
                state.validate()?;
                state.clone()
            }
            None => self.initial_state(item_id, now),
        };

        let ease_factor = self.next_ease(previous.ease_factor, quality);

        let (interval, repetitions) = if quality.is_failure() {
            (1, 0)
        } else {
            let repetitions = previous.repetitions.saturating_add(1);
            let interval = match repetitions {
                1 => self.first_interval,
                2 => self.second_interval,
                // previous interval grown by the updated ease
                _ => self.grown_interval(previous.interval, ease_factor),
            };
            (interval.clamp(1, self.maximum_interval.max(1)), repetitions)
        };

        let next_review_at = now
            .checked_add_signed(Duration::days(i64::from(interval)))
            .ok_or_else(|| {
                Error::invalid(format!(
                    "next review of {} in {interval} days is out of range",
                    previous.item_id
                ))
            })?;

        Ok(ReviewState {
            item_id: previous.item_id,
            ease_factor,
            interval,
            repetitions,
            next_review_at,
        })
    }
}

impl Sm2 {
    /// `interval` scaled by `ease_factor`, clamped to the maximum.
    fn grown_interval(&self, interval: u32, ease_factor: f64) -> u32 {
        let grown = (f64::from(interval) * ease_factor).round();
        grown.min(f64::from(self.maximum_interval)) as u32
    }

    fn next_ease(&self, ease_factor: f64, quality: Quality) -> f64 {
        let miss = 3.0 - f64::from(quality.value());
        (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(self.minimum_ease)
    }
}
