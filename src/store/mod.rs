pub mod keys;
pub mod memory;
pub mod migrate;
pub mod operations;
pub mod repository;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Db;
use thiserror::Error;

pub use memory::MemoryStore;
pub use repository::ProgressStore;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub config_versions: sled::Tree,
    pub word_progress: sled::Tree,
    pub progress_due_index: sled::Tree,
    pub learning_records: sled::Tree,
    pub study_configs: sled::Tree,
    pub words: sled::Tree,
    pub words_by_rank: sled::Tree,
    pub review_digests: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let config_versions = db.open_tree(trees::CONFIG_VERSIONS)?;
        let word_progress = db.open_tree(trees::WORD_PROGRESS)?;
        let progress_due_index = db.open_tree(trees::PROGRESS_DUE_INDEX)?;
        let learning_records = db.open_tree(trees::LEARNING_RECORDS)?;
        let study_configs = db.open_tree(trees::STUDY_CONFIGS)?;
        let words = db.open_tree(trees::WORDS)?;
        let words_by_rank = db.open_tree(trees::WORDS_BY_RANK)?;
        let review_digests = db.open_tree(trees::REVIEW_DIGESTS)?;

        Ok(Self {
            db,
            config_versions,
            word_progress,
            progress_due_index,
            learning_records,
            study_configs,
            words,
            words_by_rank,
            review_digests,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Deserialize inside a sled transaction, aborting it on failure.
pub(crate) fn tx_deserialize<T: DeserializeOwned>(
    bytes: &[u8],
) -> Result<T, ConflictableTransactionError<StoreError>> {
    serde_json::from_slice(bytes)
        .map_err(|error| ConflictableTransactionError::Abort(StoreError::Serialization(error)))
}

pub(crate) fn from_tx_error(error: TransactionError<StoreError>) -> StoreError {
    match error {
        TransactionError::Abort(store_error) => store_error,
        TransactionError::Storage(storage_error) => StoreError::Sled(storage_error),
    }
}
