use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::engine::{AttemptOutcome, LearningRecord, WordProgress};
use crate::store::operations::study_configs::StudyConfig;
use crate::store::repository::ProgressStore;
use crate::store::{keys, Store, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    progress: BTreeMap<(String, String), WordProgress>,
    records: Vec<LearningRecord>,
    configs: HashMap<String, StudyConfig>,
    catalog: Vec<String>,
}

/// In-process `ProgressStore`; a single mutex serializes every read-modify-write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog in introduction order.
    pub fn with_catalog<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::default();
        store.lock().catalog = words.into_iter().map(Into::into).collect();
        store
    }

    pub fn records(&self) -> Vec<LearningRecord> {
        self.lock().records.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves the maps intact, so keep going.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn pair(user_id: &str, word_id: &str) -> Result<(String, String), StoreError> {
    // Same id rules as the sled keys.
    keys::progress_key(user_id, word_id)?;
    Ok((user_id.to_string(), word_id.to_string()))
}

impl ProgressStore for MemoryStore {
    fn load_progress(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Option<WordProgress>, StoreError> {
        let key = pair(user_id, word_id)?;
        Ok(self.lock().progress.get(&key).cloned())
    }

    fn insert_progress_if_absent(
        &self,
        progress: &WordProgress,
        record: &LearningRecord,
    ) -> Result<bool, StoreError> {
        let key = pair(&progress.user_id, &progress.word_id)?;
        let mut state = self.lock();
        if state.progress.contains_key(&key) {
            return Ok(false);
        }
        state.progress.insert(key, progress.clone());
        state.records.push(record.clone());
        Ok(true)
    }

    fn update_progress<F>(
        &self,
        user_id: &str,
        word_id: &str,
        update: F,
    ) -> Result<AttemptOutcome, StoreError>
    where
        F: Fn(&WordProgress) -> AttemptOutcome,
    {
        let key = pair(user_id, word_id)?;
        let mut state = self.lock();
        let current = state.progress.get(&key).ok_or_else(|| StoreError::NotFound {
            entity: "word_progress".to_string(),
            key: format!("{user_id}:{word_id}"),
        })?;

        let outcome = update(current);
        state.progress.insert(key, outcome.progress.clone());
        state.records.push(outcome.record.clone());
        Ok(outcome)
    }

    fn list_due_progress(
        &self,
        user_id: &str,
        until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<WordProgress>, StoreError> {
        keys::progress_prefix(user_id)?;
        let state = self.lock();
        let mut due: Vec<WordProgress> = state
            .progress
            .values()
            .filter(|p| p.user_id == user_id && p.next_review_at <= until)
            .cloned()
            .collect();
        due.sort_by(|a, b| {
            a.next_review_at
                .cmp(&b.next_review_at)
                .then_with(|| a.word_id.cmp(&b.word_id))
        });
        due.truncate(limit);
        Ok(due)
    }

    fn load_study_config(&self, user_id: &str) -> Result<StudyConfig, StoreError> {
        keys::study_config_key(user_id)?;
        Ok(self
            .lock()
            .configs
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| StudyConfig::for_user(user_id)))
    }

    fn save_study_config(&self, config: &StudyConfig) -> Result<(), StoreError> {
        keys::study_config_key(&config.user_id)?;
        self.lock()
            .configs
            .insert(config.user_id.clone(), config.clone());
        Ok(())
    }

    fn candidate_new_words(&self, user_id: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        keys::progress_prefix(user_id)?;
        let state = self.lock();
        Ok(state
            .catalog
            .iter()
            .filter(|word_id| {
                !state
                    .progress
                    .contains_key(&(user_id.to_string(), (*word_id).clone()))
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

impl ProgressStore for Store {
    fn load_progress(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Option<WordProgress>, StoreError> {
        self.get_progress(user_id, word_id)
    }

    fn insert_progress_if_absent(
        &self,
        progress: &WordProgress,
        record: &LearningRecord,
    ) -> Result<bool, StoreError> {
        self.enroll_progress(progress, record)
    }

    fn update_progress<F>(
        &self,
        user_id: &str,
        word_id: &str,
        update: F,
    ) -> Result<AttemptOutcome, StoreError>
    where
        F: Fn(&WordProgress) -> AttemptOutcome,
    {
        self.apply_progress_update(user_id, word_id, update)
    }

    fn list_due_progress(
        &self,
        user_id: &str,
        until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<WordProgress>, StoreError> {
        self.get_due_progress(user_id, until, limit)
    }

    fn load_study_config(&self, user_id: &str) -> Result<StudyConfig, StoreError> {
        self.get_study_config(user_id)
    }

    fn save_study_config(&self, config: &StudyConfig) -> Result<(), StoreError> {
        self.set_study_config(config)
    }

    fn candidate_new_words(&self, user_id: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        self.get_unlearned_word_ids(user_id, limit)
    }
}
