//! Core types for the study platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ease factor given to an item that has never been reviewed.
pub const INITIAL_EASE: f64 = 2.5;

/// Lower bound of the ease factor.
pub const MINIMUM_EASE: f64 = 1.3;

/// Quality of the most recent recall attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Complete blackout.
    Again,
    /// Incorrect, but the answer was recognised once shown.
    Hard,
    /// Correct with hesitation.
    Good,
    /// Perfect recall.
    Easy,
}

impl Quality {
    /// Ordinal value (0-3).
    pub fn value(self) -> u8 {
        match self {
            Self::Again => 0,
            Self::Hard => 1,
            Self::Good => 2,
            Self::Easy => 3,
        }
    }

    /// Create from ordinal value. Anything outside 0..=3 is rejected.
    pub fn from_value(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Again),
            1 => Ok(Self::Hard),
            2 => Ok(Self::Good),
            3 => Ok(Self::Easy),
            other => Err(Error::invalid(format!(
                "quality rating {other} is outside 0..=3"
            ))),
        }
    }

    /// Whether this rating takes the failure path of the scheduler.
    ///
    /// Hard counts as a failure alongside Again.
    pub fn is_failure(self) -> bool {
        self < Self::Good
    }
}

/// Scheduling state of one memorization item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub item_id: String,
    pub ease_factor: f64,
    /// Days until the next review.
    pub interval: u32,
    /// Consecutive non-failing reviews.
    pub repetitions: u32,
    pub next_review_at: DateTime<Utc>,
}

impl ReviewState {
    /// State of an item that has never been reviewed. It is due at `now`.
    pub fn initial(item_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            ease_factor: INITIAL_EASE,
            interval: 1,
            repetitions: 0,
            next_review_at: now,
        }
    }

    /// Whether the item is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }

    /// Reject states that could not have been produced by the scheduler.
    pub fn validate(&self) -> Result<()> {
        if !self.ease_factor.is_finite() {
            return Err(Error::invalid(format!(
                "ease factor of {} is not a finite number",
                self.item_id
            )));
        }
        if self.ease_factor < MINIMUM_EASE {
            return Err(Error::invalid(format!(
                "ease factor {} of {} is below {MINIMUM_EASE}",
                self.ease_factor, self.item_id
            )));
        }
        if self.interval == 0 {
            return Err(Error::invalid(format!(
                "interval of {} must be at least one day",
                self.item_id
            )));
        }
        Ok(())
    }
}

/// Flashcard from the item catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashCard {
    pub id: String,
    pub chapter_id: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Right/wrong tally of a single card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardProgress {
    pub card_id: String,
    pub times_correct: u32,
    pub times_incorrect: u32,
    pub last_studied: DateTime<Utc>,
    /// 0-100.
    pub confidence: u32,
    #[serde(default)]
    pub is_starred: bool,
}

/// Study mode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    Flashcards,
    Learn,
    Write,
    Test,
}

impl Default for StudyMode {
    fn default() -> Self {
        Self::Flashcards
    }
}

/// One completed (or abandoned) study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub mode: StudyMode,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub cards_studied: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub time_spent_secs: u64,
}

/// Course module a lesson belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseModule {
    Fundamentals,
    Softwar,
}

impl CourseModule {
    /// Number of lessons in the module.
    pub fn total_lessons(self) -> u32 {
        match self {
            Self::Fundamentals => 6,
            // executive summary plus six chapters
            Self::Softwar => 7,
        }
    }
}

/// Completion and quiz results of a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub lesson_id: String,
    pub module: CourseModule,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_attempts: Option<u32>,
}

/// A topic the learner keeps missing in quizzes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeakArea {
    pub topic: String,
    pub miss_count: u32,
    pub related_lessons: Vec<String>,
    #[serde(default)]
    pub suggested_flashcards: Vec<String>,
}
