pub mod interval;
pub mod mastery;
pub mod pipeline;
pub mod scheduler;
pub mod status;
pub mod types;
pub mod window;

use thiserror::Error;

pub use interval::delay_for;
pub use mastery::{update_mastery, Confidence};
pub use pipeline::{apply_attempt, enroll, AttemptOutcome};
pub use scheduler::{schedule_enrollment, schedule_next};
pub use status::{classify_status, ClassificationPolicy, ThresholdPolicy};
pub use types::*;
pub use window::{review_window, review_window_at_offset, ReviewTime, ReviewWindow};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid configuration: {field}={value:?} ({reason})")]
    InvalidConfiguration {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("out of range input: {field}={value}")]
    OutOfRangeInput { field: &'static str, value: String },
}

impl EngineError {
    pub(crate) fn invalid_config(field: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Self::InvalidConfiguration {
            field,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn out_of_range(field: &'static str, value: impl ToString) -> Self {
        Self::OutOfRangeInput {
            field,
            value: value.to_string(),
        }
    }
}
