//! Per-card right/wrong tracking, study sessions and study statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CardProgress, StudySession};

/// Number of study sessions kept in history.
pub const MAX_SESSIONS: usize = 100;

/// Confidence below which a card counts as weak.
pub const WEAK_THRESHOLD: u32 = 60;

/// Confidence at or above which a card counts as strong.
pub const STRONG_THRESHOLD: u32 = 80;

/// Confidence (0-100) from a right/wrong tally.
///
/// Fewer than three attempts are capped at 50.
pub fn calculate_confidence(correct: u32, incorrect: u32) -> u32 {
    let total = correct + incorrect;
    if total == 0 {
        return 0;
    }

    let ratio = f64::from(correct) / f64::from(total);
    let scale = if total < 3 { 50.0 } else { 100.0 };
    (ratio * scale).round() as u32
}

impl CardProgress {
    /// Blank record for a card that has not been answered yet.
    pub fn new(card_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            card_id: card_id.into(),
            times_correct: 0,
            times_incorrect: 0,
            last_studied: now,
            confidence: 0,
            is_starred: false,
        }
    }

    /// Record that replaces `existing` after one answer.
    pub fn record(
        existing: Option<&CardProgress>,
        card_id: &str,
        is_correct: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let (correct, incorrect, is_starred) = existing
            .map(|p| (p.times_correct, p.times_incorrect, p.is_starred))
            .unwrap_or((0, 0, false));

        let times_correct = correct + u32::from(is_correct);
        let times_incorrect = incorrect + u32::from(!is_correct);

        Self {
            card_id: card_id.to_string(),
            times_correct,
            times_incorrect,
            last_studied: now,
            confidence: calculate_confidence(times_correct, times_incorrect),
            is_starred,
        }
    }

    /// Record with the star flipped. Missing records start blank.
    pub fn toggle_star(existing: Option<&CardProgress>, card_id: &str, now: DateTime<Utc>) -> Self {
        let mut updated = existing
            .cloned()
            .unwrap_or_else(|| CardProgress::new(card_id, now));
        updated.is_starred = !updated.is_starred;
        updated
    }

    pub fn attempts(&self) -> u32 {
        self.times_correct + self.times_incorrect
    }
}

/// Ids of starred cards.
pub fn starred_cards<'a, I>(progress: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a CardProgress>,
{
    progress
        .into_iter()
        .filter(|p| p.is_starred)
        .map(|p| p.card_id.clone())
        .collect()
}

/// Cards below `threshold` confidence, weakest first.
pub fn weak_cards<'a, I>(progress: I, threshold: u32) -> Vec<&'a CardProgress>
where
    I: IntoIterator<Item = &'a CardProgress>,
{
    let mut weak: Vec<_> = progress
        .into_iter()
        .filter(|p| p.confidence < threshold)
        .collect();
    weak.sort_by_key(|p| p.confidence);
    weak
}

/// Cards at or above `threshold` confidence, strongest first.
pub fn strong_cards<'a, I>(progress: I, threshold: u32) -> Vec<&'a CardProgress>
where
    I: IntoIterator<Item = &'a CardProgress>,
{
    let mut strong: Vec<_> = progress
        .into_iter()
        .filter(|p| p.confidence >= threshold)
        .collect();
    strong.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    strong
}

/// Append a session, dropping the oldest beyond [`MAX_SESSIONS`].
pub fn push_session(sessions: &mut Vec<StudySession>, session: StudySession) {
    sessions.push(session);
    if sessions.len() > MAX_SESSIONS {
        let excess = sessions.len() - MAX_SESSIONS;
        sessions.drain(..excess);
    }
}

/// Totals over the session history and card progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyStats {
    pub total_sessions: usize,
    pub total_cards_studied: u32,
    /// Rounded percent, averaged per card. 0 when no card has progress.
    pub average_accuracy: u32,
    /// Seconds.
    pub total_time_studied: u64,
    pub cards_with_high_confidence: usize,
    pub cards_needing_review: usize,
}

impl StudyStats {
    pub fn compute(sessions: &[StudySession], progress: &[CardProgress]) -> Self {
        let total_cards_studied = progress.iter().map(CardProgress::attempts).sum();

        // cards without attempts still count in the denominator
        let average_accuracy = if progress.is_empty() {
            0
        } else {
            let ratio_sum: f64 = progress
                .iter()
                .filter(|p| p.attempts() > 0)
                .map(|p| f64::from(p.times_correct) / f64::from(p.attempts()))
                .sum();
            (ratio_sum / progress.len() as f64 * 100.0).round() as u32
        };

        Self {
            total_sessions: sessions.len(),
            total_cards_studied,
            average_accuracy,
            total_time_studied: sessions.iter().map(|s| s.time_spent_secs).sum(),
            cards_with_high_confidence: progress
                .iter()
                .filter(|p| p.confidence >= STRONG_THRESHOLD)
                .count(),
            cards_needing_review: progress
                .iter()
                .filter(|p| p.confidence < WEAK_THRESHOLD)
                .count(),
        }
    }
}
