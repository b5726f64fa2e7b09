use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::transaction::ConflictableTransactionError;
use sled::Transactional;

use crate::store::keys;
use crate::store::{from_tx_error, Store, StoreError};

/// Catalog entry. Only what new-word selection needs; content lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub text: String,
    /// Catalog order; lower ranks are introduced first.
    pub rank: u32,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn upsert_word(&self, word: &Word) -> Result<(), StoreError> {
        let key = keys::word_key(&word.id)?;
        let value = Self::serialize(word)?;
        let rank_key = keys::words_by_rank_key(word.rank, &word.id)?;

        (&self.words, &self.words_by_rank)
            .transaction(|(tx_words, tx_rank)| {
                if let Some(old_raw) = tx_words.get(key.as_bytes())? {
                    let old: Word = crate::store::tx_deserialize(&old_raw)?;
                    let old_rank_key = keys::words_by_rank_key(old.rank, &old.id)
                        .map_err(ConflictableTransactionError::Abort)?;
                    tx_rank.remove(old_rank_key.as_bytes())?;
                }
                tx_words.insert(key.as_bytes(), value.as_slice())?;
                tx_rank.insert(rank_key.as_bytes(), word.id.as_bytes())?;
                Ok(())
            })
            .map_err(from_tx_error)
    }

    pub fn get_word(&self, word_id: &str) -> Result<Option<Word>, StoreError> {
        let key = keys::word_key(word_id)?;
        match self.words.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// 按目录顺序选取用户尚未学习的单词
    pub fn get_unlearned_word_ids(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let enrolled = self.enrolled_word_ids(user_id)?;
        let mut ids = Vec::with_capacity(limit.min(128));
        for item in self.words_by_rank.iter() {
            let (_, value) = item?;
            let word_id = String::from_utf8_lossy(&value).into_owned();
            if enrolled.contains(&word_id) {
                continue;
            }
            ids.push(word_id);
            if ids.len() >= limit {
                break;
            }
        }
        Ok(ids)
    }
}
