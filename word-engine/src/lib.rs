//! In-memory word-tracking engine: a word store, a difficulty index, and a
//! spaced-repetition review scheduler, coordinated by [`WordTracker`].
//!
//! Everything here is process-lifetime state: nothing is persisted, and a
//! restart begins from empty.

pub mod difficulty;
pub mod scheduler;
pub mod store;

pub use difficulty::{DifficultyIndex, MAX_DIFFICULTY, MIN_DIFFICULTY};
pub use scheduler::ReviewScheduler;
pub use store::{DEFAULT_INTERVAL_DAYS, WordRecord, WordStore};

use std::sync::Mutex;

use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Difficulty must be between 1 and 5")]
    DifficultyOutOfRange(u8),
    #[error("Progress must be between 0 and 100")]
    ProgressOutOfRange(f64),
    #[error("Word must not be empty")]
    EmptyWord,
    #[error("Language must not be empty")]
    EmptyLanguage,
}

/// Owns the three tracking containers and fans a learning event out to all of
/// them. Each container sits behind its own mutex; operations lock exactly
/// the containers they touch and never hold a lock across I/O.
///
/// The fan-out is best-effort, not transactional: validation happens up
/// front, so in practice either nothing or everything is written, but there
/// is no rollback if that ever changes.
#[derive(Debug, Default)]
pub struct WordTracker {
    store: Mutex<WordStore>,
    scheduler: Mutex<ReviewScheduler>,
    index: Mutex<DifficultyIndex>,
}

impl WordTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a learning event: stores the word's metadata, queues it for
    /// review due immediately, and registers it in the difficulty index.
    /// Re-learning a word overwrites its record but leaves earlier index and
    /// queue entries in place.
    pub fn learn_word(
        &self,
        word: &str,
        language: &str,
        definition: &str,
        difficulty: u8,
    ) -> Result<(), EngineError> {
        if word.is_empty() {
            return Err(EngineError::EmptyWord);
        }
        if language.is_empty() {
            return Err(EngineError::EmptyLanguage);
        }

        self.store.lock().unwrap().put(
            word,
            definition,
            language,
            difficulty,
            DEFAULT_INTERVAL_DAYS,
            0.0,
        )?;
        // Interval 0: the first review is always due right away, whatever
        // the word's difficulty.
        self.scheduler.lock().unwrap().schedule(word, Utc::now(), 0);
        self.index.lock().unwrap().insert(word, difficulty)?;
        Ok(())
    }

    /// The pronunciation-practice path: same fan-out as [`Self::learn_word`],
    /// but only when the word isn't tracked yet. Returns whether it
    /// registered anything.
    pub fn register_if_new(
        &self,
        word: &str,
        language: &str,
        definition: &str,
        difficulty: u8,
    ) -> Result<bool, EngineError> {
        if self.store.lock().unwrap().get(word).is_some() {
            return Ok(false);
        }
        self.learn_word(word, language, definition, difficulty)?;
        Ok(true)
    }

    pub fn word(&self, word: &str) -> Option<WordRecord> {
        self.store.lock().unwrap().get(word).cloned()
    }

    pub fn set_progress(&self, word: &str, progress: f64) -> Result<bool, EngineError> {
        self.store.lock().unwrap().set_progress(word, progress)
    }

    pub fn all_words(&self) -> Vec<String> {
        self.store.lock().unwrap().all_words()
    }

    /// Drains every word due by `now` from the review queue.
    pub fn due_words(&self, now: DateTime<Utc>) -> Vec<String> {
        self.scheduler.lock().unwrap().pop_due(now)
    }

    pub fn words_at_difficulty(&self, difficulty: u8) -> Result<Vec<String>, EngineError> {
        self.index.lock().unwrap().words_at(difficulty)
    }

    /// Feeds a review result back into the scheduler's per-word interval.
    pub fn review_outcome(&self, word: &str, was_correct: bool) {
        self.scheduler
            .lock()
            .unwrap()
            .adjust_interval(word, was_correct);
    }
}
