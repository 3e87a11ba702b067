//! Lesson completion, quiz scores and weak-area detection.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CourseModule, LessonProgress, WeakArea};

/// Default number of weak areas surfaced to the learner.
pub const DEFAULT_WEAK_AREA_LIMIT: usize = 3;

/// Completion summary of one course module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub module: CourseModule,
    pub total_lessons: u32,
    pub completed_lessons: u32,
    pub percent_complete: f64,
    /// 0.0 when no lesson in the module has a quiz score.
    pub average_quiz_score: f64,
}

/// Mark `lesson_id` completed, keeping any quiz results.
pub fn mark_completed(
    lessons: &mut Vec<LessonProgress>,
    lesson_id: &str,
    module: CourseModule,
    now: DateTime<Utc>,
) {
    match lessons.iter_mut().find(|p| p.lesson_id == lesson_id) {
        Some(existing) => {
            existing.module = module;
            existing.completed = true;
            existing.completed_at = Some(now);
        }
        None => lessons.push(LessonProgress {
            lesson_id: lesson_id.to_string(),
            module,
            completed: true,
            completed_at: Some(now),
            quiz_score: None,
            quiz_attempts: None,
        }),
    }
}

/// Store the latest quiz score and count the attempt.
pub fn record_quiz_score(
    lessons: &mut Vec<LessonProgress>,
    lesson_id: &str,
    module: CourseModule,
    score: f64,
) {
    match lessons.iter_mut().find(|p| p.lesson_id == lesson_id) {
        Some(existing) => {
            existing.quiz_score = Some(score);
            existing.quiz_attempts = Some(existing.quiz_attempts.unwrap_or(0) + 1);
        }
        None => lessons.push(LessonProgress {
            lesson_id: lesson_id.to_string(),
            module,
            completed: false,
            completed_at: None,
            quiz_score: Some(score),
            quiz_attempts: Some(1),
        }),
    }
}

/// Summarize the lessons belonging to `module`.
pub fn module_progress(lessons: &[LessonProgress], module: CourseModule) -> ModuleProgress {
    let in_module: Vec<&LessonProgress> = lessons.iter().filter(|p| p.module == module).collect();

    let total_lessons = module.total_lessons();
    let completed_lessons = in_module.iter().filter(|p| p.completed).count() as u32;
    let percent_complete = if total_lessons > 0 {
        f64::from(completed_lessons) / f64::from(total_lessons) * 100.0
    } else {
        0.0
    };

    let scores: Vec<f64> = in_module.iter().filter_map(|p| p.quiz_score).collect();
    let average_quiz_score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    ModuleProgress {
        module,
        total_lessons,
        completed_lessons,
        percent_complete,
        average_quiz_score,
    }
}

/// Count a missed quiz question on `topic`.
pub fn record_topic_miss(areas: &mut HashMap<String, WeakArea>, topic: &str, lesson_id: &str) {
    let area = areas.entry(topic.to_string()).or_insert_with(|| WeakArea {
        topic: topic.to_string(),
        miss_count: 0,
        related_lessons: Vec::new(),
        suggested_flashcards: Vec::new(),
    });

    area.miss_count += 1;
    if !area.related_lessons.iter().any(|l| l == lesson_id) {
        area.related_lessons.push(lesson_id.to_string());
    }
}

/// Most-missed topics first, at most `limit` of them.
///
/// Equal miss counts are ordered by topic name.
pub fn top_weak_areas(areas: &HashMap<String, WeakArea>, limit: usize) -> Vec<WeakArea> {
    let mut sorted: Vec<WeakArea> = areas.values().cloned().collect();
    sorted.sort_by(|a, b| b.miss_count.cmp(&a.miss_count).then_with(|| a.topic.cmp(&b.topic)));
    sorted.truncate(limit);
    sorted
}
