use chrono::Utc;
use word_engine::WordTracker;

#[test]
fn test_learn_word_updates_all_three_containers() {
    let tracker = WordTracker::new();
    tracker
        .learn_word("ephemeral", "English", "lasting a very short time", 3)
        .unwrap();

    let record = tracker.word("ephemeral").unwrap();
    assert_eq!(record.difficulty, 3);
    assert_eq!(record.definition, "lasting a very short time");
    assert_eq!(record.language, "English");
    assert_eq!(record.progress, 0.0);

    assert!(
        tracker
            .words_at_difficulty(3)
            .unwrap()
            .contains(&"ephemeral".to_string())
    );

    // Scheduled with interval 0, so it is due right away.
    assert_eq!(tracker.due_words(Utc::now()), vec!["ephemeral".to_string()]);
    // And draining is permanent.
    assert!(tracker.due_words(Utc::now()).is_empty());
}

#[test]
fn test_relearning_overwrites_record_but_duplicates_elsewhere() {
    let tracker = WordTracker::new();
    tracker.learn_word("w", "English", "first pass", 3).unwrap();
    tracker.learn_word("w", "English", "second pass", 5).unwrap();

    // The store keeps only the latest record.
    let record = tracker.word("w").unwrap();
    assert_eq!(record.difficulty, 5);
    assert_eq!(record.definition, "second pass");

    // The index keeps the word under both difficulties it was learned at.
    assert_eq!(tracker.words_at_difficulty(3).unwrap(), vec!["w".to_string()]);
    assert_eq!(tracker.words_at_difficulty(5).unwrap(), vec!["w".to_string()]);

    // And the scheduler holds one entry per learning event.
    assert_eq!(
        tracker.due_words(Utc::now()),
        vec!["w".to_string(), "w".to_string()]
    );
}

#[test]
fn test_learn_word_validates_arguments() {
    let tracker = WordTracker::new();
    assert!(tracker.learn_word("", "English", "d", 3).is_err());
    assert!(tracker.learn_word("w", "", "d", 3).is_err());
    assert!(tracker.learn_word("w", "English", "d", 0).is_err());
    assert!(tracker.learn_word("w", "English", "d", 6).is_err());

    // Nothing should have been stored by the failed calls.
    assert!(tracker.word("w").is_none());
    assert!(tracker.all_words().is_empty());
    assert!(tracker.due_words(Utc::now()).is_empty());
}

#[test]
fn test_register_if_new_is_idempotent() {
    let tracker = WordTracker::new();

    assert!(
        tracker
            .register_if_new("ubiquitous", "en", "Pronunciation practice", 1)
            .unwrap()
    );
    // Already tracked: no second record, no second queue entry.
    assert!(
        !tracker
            .register_if_new("ubiquitous", "en", "Pronunciation practice", 1)
            .unwrap()
    );

    assert_eq!(tracker.due_words(Utc::now()), vec!["ubiquitous".to_string()]);
    assert_eq!(tracker.word("ubiquitous").unwrap().difficulty, 1);
}

#[test]
fn test_set_progress_round_trip() {
    let tracker = WordTracker::new();
    tracker.learn_word("w", "English", "d", 2).unwrap();

    assert!(tracker.set_progress("w", 150.0).is_err());
    assert!(tracker.set_progress("w", 50.0).unwrap());
    assert_eq!(tracker.word("w").unwrap().progress, 50.0);
    assert!(!tracker.set_progress("unknown", 50.0).unwrap());
}

#[test]
fn test_all_words_lists_everything_tracked() {
    let tracker = WordTracker::new();
    tracker.learn_word("a", "English", "d", 1).unwrap();
    tracker.learn_word("b", "English", "d", 2).unwrap();

    let mut words = tracker.all_words();
    words.sort();
    assert_eq!(words, vec!["a".to_string(), "b".to_string()]);
}
