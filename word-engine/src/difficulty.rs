use indexmap::IndexSet;

use crate::EngineError;

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;

/// Groups words under one of five fixed difficulty levels.
///
/// The key domain is exactly {1..=5} and the only query is an exact-level
/// lookup, so the index is a flat bucket array. Each bucket keeps insertion
/// order and suppresses duplicates. Re-registering a word at a different
/// level leaves it in the old bucket too; callers that re-learn a word will
/// see it listed at every difficulty it was ever stored under.
#[derive(Debug, Default)]
pub struct DifficultyIndex {
    buckets: [IndexSet<String>; (MAX_DIFFICULTY - MIN_DIFFICULTY + 1) as usize],
}

impl DifficultyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str, difficulty: u8) -> Result<(), EngineError> {
        validate_difficulty(difficulty)?;
        self.buckets[(difficulty - MIN_DIFFICULTY) as usize].insert(word.to_string());
        Ok(())
    }

    /// Words registered at this difficulty, in insertion order. An untouched
    /// level is an empty list, not an error.
    pub fn words_at(&self, difficulty: u8) -> Result<Vec<String>, EngineError> {
        validate_difficulty(difficulty)?;
        Ok(self.buckets[(difficulty - MIN_DIFFICULTY) as usize]
            .iter()
            .cloned()
            .collect())
    }
}

pub(crate) fn validate_difficulty(difficulty: u8) -> Result<(), EngineError> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(EngineError::DifficultyOutOfRange(difficulty));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_out_of_range_difficulty() {
        let mut index = DifficultyIndex::new();
        assert!(index.insert("w", 0).is_err());
        assert!(index.insert("w", 6).is_err());
        assert!(index.words_at(0).is_err());
        assert!(index.words_at(6).is_err());
    }

    #[test]
    fn test_double_insert_is_deduplicated_within_a_bucket() {
        let mut index = DifficultyIndex::new();
        index.insert("w", 3).unwrap();
        index.insert("w", 3).unwrap();
        assert_eq!(index.words_at(3).unwrap(), vec!["w".to_string()]);
    }

    #[test]
    fn test_reinsert_at_new_difficulty_keeps_both_buckets() {
        let mut index = DifficultyIndex::new();
        index.insert("w", 2).unwrap();
        index.insert("w", 4).unwrap();
        assert_eq!(index.words_at(2).unwrap(), vec!["w".to_string()]);
        assert_eq!(index.words_at(4).unwrap(), vec!["w".to_string()]);
    }

    #[test]
    fn test_bucket_preserves_insertion_order() {
        let mut index = DifficultyIndex::new();
        index.insert("beta", 1).unwrap();
        index.insert("alpha", 1).unwrap();
        index.insert("gamma", 1).unwrap();
        assert_eq!(
            index.words_at(1).unwrap(),
            vec!["beta".to_string(), "alpha".to_string(), "gamma".to_string()]
        );
    }

    #[test]
    fn test_untouched_bucket_is_empty() {
        let index = DifficultyIndex::new();
        assert!(index.words_at(5).unwrap().is_empty());
    }
}
