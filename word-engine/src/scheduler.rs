use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use chrono::{DateTime, Duration, Utc};

/// Time-ordered review queue for spaced repetition.
///
/// Entries are `(due_at, word)` pairs in a min-heap; the tuple ordering
/// breaks ties on the word text, so draining is deterministic. The same word
/// may be queued more than once, one entry per `schedule` call.
#[derive(Debug, Default)]
pub struct ReviewScheduler {
    queue: BinaryHeap<Reverse<(DateTime<Utc>, String)>>,
    intervals: HashMap<String, u32>,
}

impl ReviewScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, word: &str, last_reviewed_at: DateTime<Utc>, interval_days: u32) {
        let due_at = last_reviewed_at + Duration::days(i64::from(interval_days));
        self.queue.push(Reverse((due_at, word.to_string())));
        self.intervals.insert(word.to_string(), interval_days);
    }

    /// Removes and returns every word due by `now`, earliest first. Drained
    /// entries are gone; a second call at the same instant returns nothing.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut due = Vec::new();
        while let Some(Reverse((due_at, _))) = self.queue.peek() {
            if *due_at > now {
                break;
            }
            if let Some(Reverse((_, word))) = self.queue.pop() {
                due.push(word);
            }
        }
        due
    }

    /// Doubles the word's stored interval after a correct answer, resets it
    /// to one day after a miss. Entries already in the queue keep the due
    /// date they were scheduled with.
    pub fn adjust_interval(&mut self, word: &str, was_correct: bool) {
        if let Some(interval) = self.intervals.get_mut(word) {
            if was_correct {
                *interval = interval.saturating_mul(2);
            } else {
                *interval = 1;
            }
        }
    }

    pub fn current_interval(&self, word: &str) -> Option<u32> {
        self.intervals.get(word).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_zero_interval_is_due_immediately_and_drains() {
        let mut scheduler = ReviewScheduler::new();
        scheduler.schedule("w", t0(), 0);

        assert_eq!(scheduler.pop_due(t0()), vec!["w".to_string()]);
        assert!(scheduler.pop_due(t0()).is_empty());
    }

    #[test]
    fn test_future_entry_not_due_until_interval_elapses() {
        let mut scheduler = ReviewScheduler::new();
        scheduler.schedule("w", t0(), 5);

        assert!(scheduler.pop_due(t0()).is_empty());
        assert!(scheduler.pop_due(t0() + Duration::days(4)).is_empty());
        assert_eq!(
            scheduler.pop_due(t0() + Duration::days(5)),
            vec!["w".to_string()]
        );
    }

    #[test]
    fn test_pop_due_returns_earliest_first() {
        let mut scheduler = ReviewScheduler::new();
        scheduler.schedule("later", t0(), 3);
        scheduler.schedule("sooner", t0(), 1);
        scheduler.schedule("soonest", t0(), 0);

        assert_eq!(
            scheduler.pop_due(t0() + Duration::days(10)),
            vec![
                "soonest".to_string(),
                "sooner".to_string(),
                "later".to_string()
            ]
        );
    }

    #[test]
    fn test_ties_break_on_word_text() {
        let mut scheduler = ReviewScheduler::new();
        scheduler.schedule("zebra", t0(), 0);
        scheduler.schedule("apple", t0(), 0);

        assert_eq!(
            scheduler.pop_due(t0()),
            vec!["apple".to_string(), "zebra".to_string()]
        );
    }

    #[test]
    fn test_same_word_may_be_queued_twice() {
        let mut scheduler = ReviewScheduler::new();
        scheduler.schedule("w", t0(), 0);
        scheduler.schedule("w", t0(), 0);

        assert_eq!(
            scheduler.pop_due(t0()),
            vec!["w".to_string(), "w".to_string()]
        );
    }

    #[test]
    fn test_adjust_interval_doubles_and_resets() {
        let mut scheduler = ReviewScheduler::new();
        scheduler.schedule("w", t0(), 1);

        scheduler.adjust_interval("w", true);
        assert_eq!(scheduler.current_interval("w"), Some(2));
        scheduler.adjust_interval("w", true);
        assert_eq!(scheduler.current_interval("w"), Some(4));

        scheduler.adjust_interval("w", false);
        assert_eq!(scheduler.current_interval("w"), Some(1));
    }

    #[test]
    fn test_adjust_interval_ignores_unknown_words() {
        let mut scheduler = ReviewScheduler::new();
        scheduler.adjust_interval("missing", true);
        assert_eq!(scheduler.current_interval("missing"), None);
    }

    #[test]
    fn test_adjust_interval_does_not_touch_queued_entries() {
        let mut scheduler = ReviewScheduler::new();
        scheduler.schedule("w", t0(), 2);

        // Doubling the stored interval must not move the entry already queued
        // for t0 + 2 days.
        scheduler.adjust_interval("w", true);
        assert!(scheduler.pop_due(t0() + Duration::days(1)).is_empty());
        assert_eq!(
            scheduler.pop_due(t0() + Duration::days(2)),
            vec!["w".to_string()]
        );
    }
}
