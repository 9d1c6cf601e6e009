use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::EngineError;
use crate::difficulty::validate_difficulty;

/// Default days until a newly stored word comes up for review again.
pub const DEFAULT_INTERVAL_DAYS: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct WordRecord {
    pub word: String,
    pub definition: String,
    pub language: String,
    pub difficulty: u8,
    pub last_reviewed_at: DateTime<Utc>,
    pub interval_days: u32,
    pub progress: f64,
}

/// Keyed storage for everything we know about a word. Lookups are exact and
/// case-sensitive; storing a word again replaces the old record wholesale.
#[derive(Debug, Default)]
pub struct WordStore {
    records: HashMap<String, WordRecord>,
}

impl WordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(
        &mut self,
        word: &str,
        definition: &str,
        language: &str,
        difficulty: u8,
        interval_days: u32,
        progress: f64,
    ) -> Result<(), EngineError> {
        validate_difficulty(difficulty)?;
        validate_progress(progress)?;

        self.records.insert(
            word.to_string(),
            WordRecord {
                word: word.to_string(),
                definition: definition.to_string(),
                language: language.to_string(),
                difficulty,
                last_reviewed_at: Utc::now(),
                interval_days,
                progress,
            },
        );
        Ok(())
    }

    pub fn get(&self, word: &str) -> Option<&WordRecord> {
        self.records.get(word)
    }

    /// Returns whether the word existed. Unknown words are a no-op rather
    /// than an error, since "not stored yet" is a normal state.
    pub fn set_progress(&mut self, word: &str, progress: f64) -> Result<bool, EngineError> {
        validate_progress(progress)?;

        match self.records.get_mut(word) {
            Some(record) => {
                record.progress = progress;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Snapshot of every stored word. Order is whatever the backing map
    /// yields, callers must not rely on it.
    pub fn all_words(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }
}

fn validate_progress(progress: f64) -> Result<(), EngineError> {
    if !(0.0..=100.0).contains(&progress) {
        return Err(EngineError::ProgressOutOfRange(progress));
    }
    Ok(())
}
