use std::sync::Mutex;

use chrono::NaiveDate;

use crate::enrich::WordOfTheDay;

/// Single-slot cache for the daily word, keyed only by calendar date. The
/// slot is replaced when the date rolls over; nothing else invalidates it.
#[derive(Default)]
pub struct WordOfDayCache {
    slot: Mutex<Option<(NaiveDate, WordOfTheDay)>>,
}

impl WordOfDayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, today: NaiveDate) -> Option<WordOfTheDay> {
        let slot = self.slot.lock().unwrap();
        match &*slot {
            Some((date, word)) if *date == today => Some(word.clone()),
            _ => None,
        }
    }

    pub fn put(&self, today: NaiveDate, word: WordOfTheDay) {
        *self.slot.lock().unwrap() = Some((today, word));
    }
}
