use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use word_review_engine::engine::ThresholdPolicy;
use word_review_engine::learning::LearningService;
use word_review_engine::store::operations::words::Word;
use word_review_engine::store::Store;

/// Wednesday 2024-01-10 08:00 UTC.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()
}

pub fn open_store() -> (TempDir, Arc<Store>) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = Store::open(tmp.path().join("test.sled").to_str().unwrap()).expect("open store");
    store.run_migrations().expect("migrations");
    (tmp, Arc::new(store))
}

pub fn seed_words(store: &Store, count: usize) -> Vec<Word> {
    let mut out = Vec::new();
    for idx in 0..count {
        let word = Word {
            id: format!("w{idx:03}"),
            text: format!("word-{idx}"),
            rank: idx as u32,
            created_at: t0() - Duration::days(30),
        };
        store.upsert_word(&word).expect("upsert seed word");
        out.push(word);
    }
    out
}

pub fn sled_service() -> (TempDir, LearningService<Store>) {
    let (tmp, store) = open_store();
    (tmp, LearningService::new(store, ThresholdPolicy::default()))
}
