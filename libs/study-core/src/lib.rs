//! Core study library shared by the backend and any other front end.
//!
//! Provides:
//! - SM-2 review scheduling and due-set selection
//! - Smart grading of typed answers (normalization + Levenshtein distance)
//! - Card confidence, study sessions, lesson progress and weak areas
//! - Quiz question generation with an injected random source
//! - Clock and key-value store capabilities with in-memory implementations

pub mod algorithm;
pub mod clock;
pub mod due;
pub mod error;
pub mod lessons;
pub mod matching;
pub mod progress;
pub mod quiz;
pub mod store;
pub mod types;

pub use algorithm::{compute_next_review, get_scheduler, Scheduler, Sm2, MAXIMUM_INTERVAL};
pub use clock::{Clock, FixedClock, SystemClock};
pub use due::{review_stats, select_due, ReviewStats};
pub use error::{Error, Result};
pub use lessons::ModuleProgress;
pub use matching::{
    grade_answer, is_answer_correct, levenshtein_distance, normalize_answer, similarity,
    GradeFeedback, GradingResult, DEFAULT_THRESHOLD,
};
pub use progress::{calculate_confidence, StudyStats};
pub use quiz::{
    generate_adaptive_question, generate_questions, shuffle_cards, Question, QuestionType,
};
pub use store::{KeyValueStore, LessonRepository, MemoryStore, ProgressRepository, ReviewRepository};
pub use types::{
    CardProgress, CourseModule, FlashCard, LessonProgress, Quality, ReviewState, StudyMode,
    StudySession, WeakArea, INITIAL_EASE, MINIMUM_EASE,
};
