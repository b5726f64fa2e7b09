use chrono::{DateTime, Utc};

use crate::engine::{AttemptOutcome, LearningRecord, WordProgress};
use crate::store::operations::study_configs::StudyConfig;
use crate::store::StoreError;

/// Persistence collaborator of the learning service.
///
/// Implementations own atomicity: `update_progress` must run the read, the
/// update and both writes as one unit per (user, word) pair, and
/// `insert_progress_if_absent` must never enroll a pair twice.
pub trait ProgressStore: Send + Sync {
    fn load_progress(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Option<WordProgress>, StoreError>;

    /// Insert a fresh progress row and its audit record unless the pair already
    /// exists. Returns `false` (and writes nothing) when it does.
    fn insert_progress_if_absent(
        &self,
        progress: &WordProgress,
        record: &LearningRecord,
    ) -> Result<bool, StoreError>;

    /// Atomically read the current row, compute the outcome and write the new
    /// row plus its audit record. `update` may be invoked more than once when
    /// the backend retries a conflicting write.
    fn update_progress<F>(
        &self,
        user_id: &str,
        word_id: &str,
        update: F,
    ) -> Result<AttemptOutcome, StoreError>
    where
        F: Fn(&WordProgress) -> AttemptOutcome;

    /// Rows due at or before `until`, earliest first.
    fn list_due_progress(
        &self,
        user_id: &str,
        until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<WordProgress>, StoreError>;

    /// Stored config, or the defaults for users who never saved one.
    fn load_study_config(&self, user_id: &str) -> Result<StudyConfig, StoreError>;

    fn save_study_config(&self, config: &StudyConfig) -> Result<(), StoreError>;

    /// Catalog words the user has not enrolled yet, in catalog order.
    fn candidate_new_words(&self, user_id: &str, limit: usize) -> Result<Vec<String>, StoreError>;
}
