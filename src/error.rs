use thiserror::Error;

use crate::engine::EngineError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Errors caused by caller input rather than by the backend.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            Self::Engine(_) | Self::Store(StoreError::NotFound { .. } | StoreError::Validation(_))
        )
    }
}
