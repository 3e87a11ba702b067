//! Key-value persistence capability and typed repositories over it.
//!
//! Values are JSON text. Every repository is bound to a namespace (the
//! user id) so one store can hold many learners.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::algorithm::{Scheduler, Sm2};
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::lessons::{self, ModuleProgress};
use crate::progress::{self, StudyStats};
use crate::types::{
    CardProgress, CourseModule, LessonProgress, Quality, ReviewState, StudySession, WeakArea,
};

/// Namespace used when no user is signed in.
pub const ANONYMOUS: &str = "anonymous";

const REVIEW_PREFIX: &str = "flashcard-reviews/";
const PROGRESS_PREFIX: &str = "flashcard-progress/";
const SESSIONS_KEY: &str = "study-sessions";
const LESSONS_KEY: &str = "learning-progress";
const WEAK_AREAS_KEY: &str = "weak-areas";

/// Keyed storage. A single `set` replaces the whole value atomically.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>>;

    fn set(&self, namespace: &str, key: &str, value: String) -> Result<()>;

    /// Returns whether a value was removed.
    fn remove(&self, namespace: &str, key: &str) -> Result<bool>;

    /// All entries whose key starts with `prefix`, ordered by key.
    fn scan_prefix(&self, namespace: &str, prefix: &str) -> Result<Vec<(String, String)>>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Storage("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    fn set(&self, namespace: &str, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        Ok(entries
            .get_mut(namespace)
            .and_then(|ns| ns.remove(key))
            .is_some())
    }

    fn scan_prefix(&self, namespace: &str, prefix: &str) -> Result<Vec<(String, String)>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(namespace)
            .map(|ns| {
                ns.range(prefix.to_string()..)
                    .take_while(|(k, _)| k.starts_with(prefix))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    namespace: &str,
    key: &str,
) -> Result<Option<T>> {
    store
        .get(namespace, key)?
        .map(|raw| serde_json::from_str(&raw).map_err(Error::from))
        .transpose()
}

fn write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    namespace: &str,
    key: &str,
    value: &T,
) -> Result<()> {
    store.set(namespace, key, serde_json::to_string(value)?)
}

fn scan_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    namespace: &str,
    prefix: &str,
) -> Result<Vec<T>> {
    store
        .scan_prefix(namespace, prefix)?
        .into_iter()
        .map(|(_, raw)| serde_json::from_str(&raw).map_err(Error::from))
        .collect()
}

/// Review states of one learner.
pub struct ReviewRepository<'a> {
    store: &'a dyn KeyValueStore,
    namespace: String,
    scheduler: Box<dyn Scheduler>,
}

impl<'a> ReviewRepository<'a> {
    pub fn new(store: &'a dyn KeyValueStore, user_id: impl Into<String>) -> Self {
        Self {
            store,
            namespace: user_id.into(),
            scheduler: Box::new(Sm2::default()),
        }
    }

    /// Use a different scheduler for [`review`](Self::review).
    pub fn with_scheduler(mut self, scheduler: Box<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn get(&self, item_id: &str) -> Result<Option<ReviewState>> {
        read_json(self.store, &self.namespace, &format!("{REVIEW_PREFIX}{item_id}"))
    }

    pub fn load_all(&self) -> Result<Vec<ReviewState>> {
        scan_json(self.store, &self.namespace, REVIEW_PREFIX)
    }

    /// Replace the stored state of `state.item_id`.
    pub fn save(&self, state: &ReviewState) -> Result<()> {
        tracing::debug!(
            user = %self.namespace,
            item = %state.item_id,
            interval = state.interval,
            "saving review state"
        );
        write_json(
            self.store,
            &self.namespace,
            &format!("{REVIEW_PREFIX}{}", state.item_id),
            state,
        )
    }

    /// Schedule `item_id` after a review and persist the result.
    pub fn review(
        &self,
        item_id: &str,
        quality: Quality,
        clock: &dyn Clock,
    ) -> Result<ReviewState> {
        let previous = self.get(item_id)?;
        let next = self
            .scheduler
            .schedule(previous.as_ref(), item_id, quality, clock.now())?;
        self.save(&next)?;
        Ok(next)
    }
}

/// Card progress and study sessions of one learner.
pub struct ProgressRepository<'a> {
    store: &'a dyn KeyValueStore,
    namespace: String,
}

impl<'a> ProgressRepository<'a> {
    pub fn new(store: &'a dyn KeyValueStore, user_id: impl Into<String>) -> Self {
        Self {
            store,
            namespace: user_id.into(),
        }
    }

    fn progress_key(card_id: &str) -> String {
        format!("{PROGRESS_PREFIX}{card_id}")
    }

    pub fn get(&self, card_id: &str) -> Result<Option<CardProgress>> {
        read_json(self.store, &self.namespace, &Self::progress_key(card_id))
    }

    pub fn load_all(&self) -> Result<Vec<CardProgress>> {
        scan_json(self.store, &self.namespace, PROGRESS_PREFIX)
    }

    /// Count one answer to `card_id`.
    pub fn record_answer(
        &self,
        card_id: &str,
        is_correct: bool,
        clock: &dyn Clock,
    ) -> Result<CardProgress> {
        let existing = self.get(card_id)?;
        let updated = CardProgress::record(existing.as_ref(), card_id, is_correct, clock.now());
        write_json(self.store, &self.namespace, &Self::progress_key(card_id), &updated)?;
        tracing::debug!(
            user = %self.namespace,
            card = card_id,
            confidence = updated.confidence,
            "recorded answer"
        );
        Ok(updated)
    }

    /// Flip the star of `card_id`, returning whether it is now starred.
    pub fn toggle_star(&self, card_id: &str, clock: &dyn Clock) -> Result<bool> {
        let existing = self.get(card_id)?;
        let updated = CardProgress::toggle_star(existing.as_ref(), card_id, clock.now());
        write_json(self.store, &self.namespace, &Self::progress_key(card_id), &updated)?;
        Ok(updated.is_starred)
    }

    pub fn starred_cards(&self) -> Result<Vec<String>> {
        Ok(progress::starred_cards(&self.load_all()?))
    }

    pub fn weak_cards(&self, threshold: u32) -> Result<Vec<CardProgress>> {
        let all = self.load_all()?;
        Ok(progress::weak_cards(&all, threshold).into_iter().cloned().collect())
    }

    pub fn strong_cards(&self, threshold: u32) -> Result<Vec<CardProgress>> {
        let all = self.load_all()?;
        Ok(progress::strong_cards(&all, threshold).into_iter().cloned().collect())
    }

    pub fn sessions(&self) -> Result<Vec<StudySession>> {
        Ok(read_json(self.store, &self.namespace, SESSIONS_KEY)?.unwrap_or_default())
    }

    pub fn save_session(&self, session: StudySession) -> Result<()> {
        let mut sessions = self.sessions()?;
        progress::push_session(&mut sessions, session);
        write_json(self.store, &self.namespace, SESSIONS_KEY, &sessions)
    }

    pub fn study_stats(&self) -> Result<StudyStats> {
        Ok(StudyStats::compute(&self.sessions()?, &self.load_all()?))
    }
}

/// Lesson completion and weak areas of one learner.
pub struct LessonRepository<'a> {
    store: &'a dyn KeyValueStore,
    namespace: String,
}

impl<'a> LessonRepository<'a> {
    pub fn new(store: &'a dyn KeyValueStore, user_id: impl Into<String>) -> Self {
        Self {
            store,
            namespace: user_id.into(),
        }
    }

    pub fn lessons(&self) -> Result<Vec<LessonProgress>> {
        Ok(read_json(self.store, &self.namespace, LESSONS_KEY)?.unwrap_or_default())
    }

    pub fn lesson(&self, lesson_id: &str) -> Result<Option<LessonProgress>> {
        Ok(self.lessons()?.into_iter().find(|p| p.lesson_id == lesson_id))
    }

    pub fn mark_completed(
        &self,
        lesson_id: &str,
        module: CourseModule,
        clock: &dyn Clock,
    ) -> Result<()> {
        let mut all = self.lessons()?;
        lessons::mark_completed(&mut all, lesson_id, module, clock.now());
        write_json(self.store, &self.namespace, LESSONS_KEY, &all)
    }

    pub fn record_quiz_score(
        &self,
        lesson_id: &str,
        module: CourseModule,
        score: f64,
    ) -> Result<()> {
        let mut all = self.lessons()?;
        lessons::record_quiz_score(&mut all, lesson_id, module, score);
        write_json(self.store, &self.namespace, LESSONS_KEY, &all)
    }

    pub fn module_progress(&self, module: CourseModule) -> Result<ModuleProgress> {
        Ok(lessons::module_progress(&self.lessons()?, module))
    }

    pub fn record_topic_miss(&self, topic: &str, lesson_id: &str) -> Result<()> {
        let mut areas: HashMap<String, WeakArea> =
            read_json(self.store, &self.namespace, WEAK_AREAS_KEY)?.unwrap_or_default();
        lessons::record_topic_miss(&mut areas, topic, lesson_id);
        write_json(self.store, &self.namespace, WEAK_AREAS_KEY, &areas)
    }

    pub fn weak_areas(&self, limit: usize) -> Result<Vec<WeakArea>> {
        let areas: HashMap<String, WeakArea> =
            read_json(self.store, &self.namespace, WEAK_AREAS_KEY)?.unwrap_or_default();
        Ok(lessons::top_weak_areas(&areas, limit))
    }

    /// Forget all lesson progress and weak areas.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.namespace, LESSONS_KEY)?;
        self.store.remove(&self.namespace, WEAK_AREAS_KEY)?;
        Ok(())
    }
}
