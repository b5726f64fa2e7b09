use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::engine::LearningRecord;
use crate::store::keys;
use crate::store::{Store, StoreError};

impl Store {
    /// Newest first.
    pub fn get_user_records(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<LearningRecord>, StoreError> {
        let prefix = keys::record_prefix(user_id)?;
        let mut records = Vec::new();
        for item in self.learning_records.scan_prefix(prefix.as_bytes()) {
            if records.len() >= limit {
                break;
            }
            let (_, value) = item?;
            records.push(Self::deserialize::<LearningRecord>(&value)?);
        }
        Ok(records)
    }

    pub fn get_user_word_records(
        &self,
        user_id: &str,
        word_id: &str,
        limit: usize,
    ) -> Result<Vec<LearningRecord>, StoreError> {
        let prefix = keys::record_prefix(user_id)?;
        let mut records = Vec::new();
        for item in self.learning_records.scan_prefix(prefix.as_bytes()) {
            if records.len() >= limit {
                break;
            }
            let (_, value) = item?;
            let record: LearningRecord = Self::deserialize(&value)?;
            if record.word_id == word_id {
                records.push(record);
            }
        }
        Ok(records)
    }

    pub fn count_user_records(&self, user_id: &str) -> Result<usize, StoreError> {
        let prefix = keys::record_prefix(user_id)?;
        let mut count = 0usize;
        for item in self.learning_records.scan_prefix(prefix.as_bytes()) {
            let _ = item?;
            count += 1;
        }
        Ok(count)
    }

    /// Records with `since <= created_at < until`, counted from key timestamps only.
    pub fn count_user_records_between(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        let prefix = keys::record_prefix(user_id)?;
        let since_ms = since.timestamp_millis();
        let until_ms = until.timestamp_millis();
        let mut count = 0usize;

        // Keys run newest to oldest.
        for item in self.learning_records.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let Some(ts) = keys::parse_record_timestamp_ms(&key) else {
                continue;
            };
            if ts >= until_ms {
                continue;
            }
            if ts < since_ms {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    /// 当日（UTC）学习记录数
    pub fn count_user_records_on(&self, user_id: &str, day: NaiveDate) -> Result<usize, StoreError> {
        let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
        self.count_user_records_between(user_id, start, start + Duration::days(1))
    }
}
