use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// One per user per day, written by the review digest worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDigest {
    pub user_id: String,
    pub date: NaiveDate,
    pub due_count: u64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Returns `false` if a digest for that user and date already exists.
    pub fn insert_review_digest(&self, digest: &ReviewDigest) -> Result<bool, StoreError> {
        let key = keys::review_digest_key(&digest.user_id, digest.date)?;
        let value = Self::serialize(digest)?;
        let swapped = self
            .review_digests
            .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(value))?;
        Ok(swapped.is_ok())
    }

    pub fn get_review_digest(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ReviewDigest>, StoreError> {
        let key = keys::review_digest_key(user_id, date)?;
        match self.review_digests.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn list_review_digests(&self, user_id: &str) -> Result<Vec<ReviewDigest>, StoreError> {
        let prefix = keys::review_digest_prefix(user_id)?;
        let mut digests = Vec::new();
        for item in self.review_digests.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            digests.push(Self::deserialize::<ReviewDigest>(&value)?);
        }
        Ok(digests)
    }
}
