mod common;

use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};

use common::fixtures::{open_store, seed_words, sled_service, t0};
use word_review_engine::engine::{ActionType, AttemptKind, ThresholdPolicy, WordStatus};
use word_review_engine::learning::{LearningService, StudyConfigUpdate};
use word_review_engine::store::{MemoryStore, ProgressStore};

#[test]
fn it_word_reaches_mastered_after_confident_reviews() {
    let (_tmp, svc) = sled_service();
    svc.enroll_word("u1", "w1", t0()).unwrap();

    let mut now = t0();
    let mut last = None;
    for _ in 0..4 {
        let outcome = svc
            .record_attempt("u1", "w1", true, 5, AttemptKind::Review, now)
            .unwrap();
        now = outcome.progress.next_review_at;
        last = Some(outcome);
    }

    let outcome = last.unwrap();
    assert_eq!(outcome.progress.mastery_score, 100.0);
    assert_eq!(outcome.progress.status, WordStatus::Mastered);
    assert_eq!(outcome.progress.review_count, 4);

    let records = svc.store().get_user_word_records("u1", "w1", 10).unwrap();
    assert_eq!(records.len(), 5);
    let actions: Vec<_> = records.iter().map(|r| r.action_type).collect();
    assert!(actions.contains(&ActionType::NewWord));
    assert_eq!(
        actions.iter().filter(|a| **a == ActionType::Mastered).count(),
        1
    );
}

#[test]
fn it_repeated_failures_mark_word_forgotten() {
    let (_tmp, svc) = sled_service();
    svc.enroll_word("u1", "w1", t0()).unwrap();

    let mut statuses = Vec::new();
    for i in 0..4 {
        let outcome = svc
            .record_attempt("u1", "w1", false, 3, AttemptKind::Test, t0() + Duration::hours(i))
            .unwrap();
        statuses.push(outcome.progress.status);
    }
    assert_eq!(
        statuses,
        vec![
            WordStatus::Learning,
            WordStatus::Learning,
            WordStatus::Learning,
            WordStatus::Forgotten
        ]
    );
}

#[test]
fn it_daily_words_follow_catalog_rank() {
    let (_tmp, svc) = sled_service();
    seed_words(svc.store(), 5);
    svc.update_study_config(
        "u1",
        StudyConfigUpdate {
            daily_new_words_count: Some(2),
            ..Default::default()
        },
    )
    .unwrap();

    let first = svc.enroll_daily_words("u1", t0()).unwrap();
    let ids: Vec<_> = first.iter().map(|p| p.word_id.as_str()).collect();
    assert_eq!(ids, vec!["w000", "w001"]);

    let second = svc
        .enroll_daily_words("u1", t0() + Duration::days(1))
        .unwrap();
    let ids: Vec<_> = second.iter().map(|p| p.word_id.as_str()).collect();
    assert_eq!(ids, vec!["w002", "w003"]);

    let stats = svc.store().progress_stats("u1", t0().date_naive()).unwrap();
    assert_eq!(stats.total_words, 4);
    assert_eq!(stats.new_count, 4);
    assert_eq!(stats.today_learning_count, 2);
}

#[test]
fn it_due_reviews_list_window_in_due_order() {
    let (_tmp, svc) = sled_service();
    svc.enroll_word("u1", "b", t0() + Duration::minutes(1)).unwrap();
    svc.enroll_word("u1", "a", t0()).unwrap();

    let due = svc
        .due_reviews("u1", Utc.with_ymd_and_hms(2024, 1, 10, 19, 0, 0).unwrap())
        .unwrap();
    assert!(due.in_window);
    assert_eq!(
        due.window.end,
        Utc.with_ymd_and_hms(2024, 1, 10, 22, 0, 0).unwrap()
    );
    let ids: Vec<_> = due.words.iter().map(|p| p.word_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn it_concurrent_attempts_are_not_lost_on_sled() {
    let (_tmp, store) = open_store();
    let svc = LearningService::new(store, ThresholdPolicy::default());
    svc.enroll_word("u1", "w1", t0()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let svc = svc.clone();
            thread::spawn(move || {
                for j in 0..5 {
                    svc.record_attempt(
                        "u1",
                        "w1",
                        (i + j) % 2 == 0,
                        3,
                        AttemptKind::Review,
                        t0() + Duration::minutes(i * 5 + j),
                    )
                    .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let progress = svc.store().load_progress("u1", "w1").unwrap().unwrap();
    assert_eq!(progress.review_count, 40);
    assert_eq!(svc.store().count_user_records("u1").unwrap(), 41);
    let due = svc
        .store()
        .get_due_progress("u1", progress.next_review_at, 10)
        .unwrap();
    assert_eq!(due.len(), 1);
}

#[test]
fn it_concurrent_attempts_are_not_lost_in_memory() {
    let svc = LearningService::new(Arc::new(MemoryStore::new()), ThresholdPolicy::default());
    svc.enroll_word("u1", "w1", t0()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let svc = svc.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    svc.record_attempt("u1", "w1", true, 1, AttemptKind::Review, t0())
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let progress = svc.store().load_progress("u1", "w1").unwrap().unwrap();
    assert_eq!(progress.review_count, 80);
    assert_eq!(svc.store().records().len(), 81);
}

#[test]
fn it_concurrent_enrollment_inserts_once() {
    let (_tmp, store) = open_store();
    let svc = LearningService::new(store, ThresholdPolicy::default());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let svc = svc.clone();
            thread::spawn(move || svc.enroll_word("u1", "w1", t0()).unwrap().inserted)
        })
        .collect();
    let inserted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|inserted| *inserted)
        .count();

    assert_eq!(inserted, 1);
    assert_eq!(svc.store().count_user_records("u1").unwrap(), 1);
}
