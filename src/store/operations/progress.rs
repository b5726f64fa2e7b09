use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::ConflictableTransactionError;
use sled::Transactional;

use crate::engine::mastery::round2;
use crate::engine::{AttemptOutcome, LearningRecord, WordProgress, WordStatus};
use crate::store::keys;
use crate::store::{from_tx_error, tx_deserialize, Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_words: u64,
    pub new_count: u64,
    pub learning: u64,
    pub mastered: u64,
    pub forgotten: u64,
    /// new + learning + forgotten
    pub in_progress: u64,
    pub avg_mastery_score: f64,
    pub today_learning_count: u64,
}

fn due_key_for(progress: &WordProgress) -> Result<String, StoreError> {
    keys::due_index_key(
        &progress.user_id,
        progress.next_review_at.timestamp_millis(),
        &progress.word_id,
    )
}

impl Store {
    pub fn get_progress(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Option<WordProgress>, StoreError> {
        let key = keys::progress_key(user_id, word_id)?;
        match self.word_progress.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// Insert-if-absent enrollment; the row, its due index entry and the
    /// audit record are written in one transaction.
    pub fn enroll_progress(
        &self,
        progress: &WordProgress,
        record: &LearningRecord,
    ) -> Result<bool, StoreError> {
        let key = keys::progress_key(&progress.user_id, &progress.word_id)?;
        let value = Self::serialize(progress)?;
        let due_key = due_key_for(progress)?;
        let record_key = keys::record_key(
            &record.user_id,
            record.created_at.timestamp_millis(),
            &record.id,
        )?;
        let record_value = Self::serialize(record)?;

        let inserted = (
            &self.word_progress,
            &self.progress_due_index,
            &self.learning_records,
        )
            .transaction(|(tx_progress, tx_due, tx_records)| {
                if tx_progress.get(key.as_bytes())?.is_some() {
                    return Ok(false);
                }
                tx_progress.insert(key.as_bytes(), value.as_slice())?;
                tx_due.insert(due_key.as_bytes(), &[])?;
                tx_records.insert(record_key.as_bytes(), record_value.as_slice())?;
                Ok(true)
            })
            .map_err(from_tx_error)?;

        Ok(inserted)
    }

    /// Read-modify-write of one progress row.
    ///
    /// sled re-runs the closure when another writer touched the same keys, so
    /// two concurrent attempts on a pair are applied one after the other.
    pub fn apply_progress_update<F>(
        &self,
        user_id: &str,
        word_id: &str,
        update: F,
    ) -> Result<AttemptOutcome, StoreError>
    where
        F: Fn(&WordProgress) -> AttemptOutcome,
    {
        let key = keys::progress_key(user_id, word_id)?;

        (
            &self.word_progress,
            &self.progress_due_index,
            &self.learning_records,
        )
            .transaction(|(tx_progress, tx_due, tx_records)| {
                let Some(raw) = tx_progress.get(key.as_bytes())? else {
                    return Err(ConflictableTransactionError::Abort(StoreError::NotFound {
                        entity: "word_progress".to_string(),
                        key: key.clone(),
                    }));
                };
                let current: WordProgress = tx_deserialize(&raw)?;
                let outcome = update(&current);

                let old_due = due_key_for(&current).map_err(ConflictableTransactionError::Abort)?;
                let new_due =
                    due_key_for(&outcome.progress).map_err(ConflictableTransactionError::Abort)?;
                let record_key = keys::record_key(
                    &outcome.record.user_id,
                    outcome.record.created_at.timestamp_millis(),
                    &outcome.record.id,
                )
                .map_err(ConflictableTransactionError::Abort)?;
                let progress_bytes =
                    Self::serialize(&outcome.progress).map_err(ConflictableTransactionError::Abort)?;
                let record_bytes =
                    Self::serialize(&outcome.record).map_err(ConflictableTransactionError::Abort)?;

                tx_progress.insert(key.as_bytes(), progress_bytes)?;
                tx_due.remove(old_due.as_bytes())?;
                tx_due.insert(new_due.as_bytes(), &[])?;
                tx_records.insert(record_key.as_bytes(), record_bytes)?;

                Ok(outcome)
            })
            .map_err(from_tx_error)
    }

    pub fn get_due_progress(
        &self,
        user_id: &str,
        until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<WordProgress>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let prefix = keys::due_index_prefix(user_id)?;
        let until_ms = until.timestamp_millis().max(0);
        let mut due = Vec::with_capacity(limit.min(64));
        let mut seen_word_ids = HashSet::new();

        for item in self.progress_due_index.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let Some((due_ts_ms, word_id)) = keys::parse_due_index_key(&key) else {
                continue;
            };
            if due_ts_ms > until_ms {
                break;
            }

            // Skip index entries that no longer match the stored row.
            if let Some(progress) = self.get_progress(user_id, &word_id)? {
                if progress.next_review_at.timestamp_millis().max(0) == due_ts_ms
                    && seen_word_ids.insert(word_id)
                {
                    due.push(progress);
                    if due.len() >= limit {
                        break;
                    }
                }
            }
        }

        Ok(due)
    }

    pub fn list_user_progress(&self, user_id: &str) -> Result<Vec<WordProgress>, StoreError> {
        let prefix = keys::progress_prefix(user_id)?;
        let mut rows = Vec::new();
        for item in self.word_progress.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            rows.push(Self::deserialize::<WordProgress>(&value)?);
        }
        Ok(rows)
    }

    pub fn enrolled_word_ids(&self, user_id: &str) -> Result<HashSet<String>, StoreError> {
        let prefix = keys::progress_prefix(user_id)?;
        let mut ids = HashSet::new();
        for item in self.word_progress.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let key_text = String::from_utf8_lossy(&key);
            if let Some(word_id) = key_text.strip_prefix(prefix.as_str()) {
                ids.insert(word_id.to_string());
            }
        }
        Ok(ids)
    }

    /// 学习统计：状态分布、平均掌握度、当日学习记录数
    pub fn progress_stats(&self, user_id: &str, day: NaiveDate) -> Result<ProgressStats, StoreError> {
        let mut stats = ProgressStats::default();
        let mut mastery_sum = 0.0;

        for progress in self.list_user_progress(user_id)? {
            stats.total_words += 1;
            mastery_sum += progress.mastery_score;
            match progress.status {
                WordStatus::New => stats.new_count += 1,
                WordStatus::Learning => stats.learning += 1,
                WordStatus::Mastered => stats.mastered += 1,
                WordStatus::Forgotten => stats.forgotten += 1,
            }
        }

        stats.in_progress = stats.new_count + stats.learning + stats.forgotten;
        if stats.total_words > 0 {
            stats.avg_mastery_score = round2(mastery_sum / stats.total_words as f64);
        }
        stats.today_learning_count = self.count_user_records_on(user_id, day)? as u64;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    use super::*;
    use crate::engine::{apply_attempt, enroll, Attempt, AttemptKind, Confidence, ThresholdPolicy};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()
    }

    fn open(name: &str) -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join(name).to_str().unwrap()).unwrap();
        (dir, store)
    }

    fn correct(confidence: u8) -> Attempt {
        Attempt {
            is_correct: true,
            confidence: Confidence::new(confidence).unwrap(),
            kind: AttemptKind::Review,
        }
    }

    #[test]
    fn enrollment_is_insert_if_absent() {
        let (_dir, store) = open("db-enroll");
        let (progress, record) = enroll("u1", "w1", t0());
        assert!(store.enroll_progress(&progress, &record).unwrap());

        let (again, again_record) = enroll("u1", "w1", t0() + Duration::hours(1));
        assert!(!store.enroll_progress(&again, &again_record).unwrap());

        let stored = store.get_progress("u1", "w1").unwrap().unwrap();
        assert_eq!(stored.created_at, t0());
        assert_eq!(store.count_user_records("u1").unwrap(), 1);
    }

    #[test]
    fn update_writes_progress_index_and_record_together() {
        let (_dir, store) = open("db-update");
        let (progress, record) = enroll("u1", "w1", t0());
        store.enroll_progress(&progress, &record).unwrap();

        let now = t0() + Duration::minutes(10);
        let outcome = store
            .apply_progress_update("u1", "w1", |current| {
                apply_attempt(current, &correct(4), &ThresholdPolicy::default(), now)
            })
            .unwrap();

        let stored = store.get_progress("u1", "w1").unwrap().unwrap();
        assert_eq!(stored, outcome.progress);
        assert_eq!(stored.review_count, 1);
        assert_eq!(stored.mastery_score, 20.0);
        assert_eq!(store.count_user_records("u1").unwrap(), 2);

        // Old due entry is gone; only the new one remains.
        assert_eq!(store.progress_due_index.len(), 1);
        let due = store.get_due_progress("u1", now + Duration::minutes(5), 10).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].next_review_at, now + Duration::minutes(5));
    }

    #[test]
    fn update_of_unknown_pair_is_not_found() {
        let (_dir, store) = open("db-missing");
        let err = store
            .apply_progress_update("u1", "nope", |current| {
                apply_attempt(current, &correct(1), &ThresholdPolicy::default(), t0())
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.learning_records.len(), 0);
    }

    #[test]
    fn due_rows_are_ordered_and_limited() {
        let (_dir, store) = open("db-due");
        for (word, offset) in [("w1", 30), ("w2", 5), ("w3", 90), ("w4", 10)] {
            let (mut progress, record) = enroll("u1", word, t0());
            progress.next_review_at = t0() + Duration::minutes(offset);
            store.enroll_progress(&progress, &record).unwrap();
        }
        let (other, other_record) = enroll("u2", "w1", t0());
        store.enroll_progress(&other, &other_record).unwrap();

        let due = store.get_due_progress("u1", t0() + Duration::minutes(60), 10).unwrap();
        let ids: Vec<_> = due.iter().map(|p| p.word_id.as_str()).collect();
        assert_eq!(ids, vec!["w2", "w4", "w1"]);

        let limited = store.get_due_progress("u1", t0() + Duration::minutes(60), 2).unwrap();
        assert_eq!(limited.len(), 2);
        assert!(store.get_due_progress("u1", t0(), 0).unwrap().is_empty());
    }

    #[test]
    fn stats_count_statuses_and_average() {
        let (_dir, store) = open("db-stats");
        let (p1, r1) = enroll("u1", "w1", t0());
        let (p2, r2) = enroll("u1", "w2", t0());
        store.enroll_progress(&p1, &r1).unwrap();
        store.enroll_progress(&p2, &r2).unwrap();
        store
            .apply_progress_update("u1", "w1", |current| {
                apply_attempt(current, &correct(5), &ThresholdPolicy::default(), t0())
            })
            .unwrap();

        let stats = store.progress_stats("u1", t0().date_naive()).unwrap();
        assert_eq!(stats.total_words, 2);
        assert_eq!(stats.new_count, 1);
        assert_eq!(stats.learning, 1);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.avg_mastery_score, 12.5);
        assert_eq!(stats.today_learning_count, 3);

        let empty = store.progress_stats("nobody", t0().date_naive()).unwrap();
        assert_eq!(empty.avg_mastery_score, 0.0);
    }

    #[test]
    fn enrolled_ids_are_scoped_to_user() {
        let (_dir, store) = open("db-enrolled");
        for (user, word) in [("u1", "a"), ("u1", "b"), ("u10", "c")] {
            let (p, r) = enroll(user, word, t0());
            store.enroll_progress(&p, &r).unwrap();
        }
        let ids = store.enrolled_word_ids("u1").unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("a") && ids.contains("b"));
    }
}
