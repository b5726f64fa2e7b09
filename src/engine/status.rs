use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FORGOTTEN_AFTER_REVIEWS, DEFAULT_FORGOTTEN_THRESHOLD, DEFAULT_MASTERED_THRESHOLD,
    MASTERY_MAX, MASTERY_MIN,
};

use super::types::WordStatus;
use super::EngineError;

/// Maps a post-attempt mastery score and review count to a lifecycle status.
///
/// Enrollment never goes through a policy; `New` is assigned directly.
pub trait ClassificationPolicy: Send + Sync {
    fn classify(&self, mastery: f64, review_count: u32) -> WordStatus;
}

/// Canonical threshold policy.
///
/// - `mastery >= mastered_at` -> `Mastered`
/// - `mastery <= forgotten_at` and `review_count > forgotten_after_reviews` -> `Forgotten`
/// - otherwise `Learning`
///
/// The mastered check runs first, so it wins if the two ranges ever overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdPolicy {
    pub mastered_at: f64,
    pub forgotten_at: f64,
    pub forgotten_after_reviews: u32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            mastered_at: DEFAULT_MASTERED_THRESHOLD,
            forgotten_at: DEFAULT_FORGOTTEN_THRESHOLD,
            forgotten_after_reviews: DEFAULT_FORGOTTEN_AFTER_REVIEWS,
        }
    }
}

impl ThresholdPolicy {
    pub fn new(
        mastered_at: f64,
        forgotten_at: f64,
        forgotten_after_reviews: u32,
    ) -> Result<Self, EngineError> {
        let policy = Self {
            mastered_at,
            forgotten_at,
            forgotten_after_reviews,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let range = MASTERY_MIN..=MASTERY_MAX;
        if !range.contains(&self.mastered_at) {
            return Err(EngineError::invalid_config(
                "mastered_at",
                self.mastered_at,
                "must be within [0, 100]",
            ));
        }
        if !range.contains(&self.forgotten_at) {
            return Err(EngineError::invalid_config(
                "forgotten_at",
                self.forgotten_at,
                "must be within [0, 100]",
            ));
        }
        if self.forgotten_at >= self.mastered_at {
            return Err(EngineError::invalid_config(
                "forgotten_at",
                self.forgotten_at,
                "must be below mastered_at",
            ));
        }
        Ok(())
    }
}

impl ClassificationPolicy for ThresholdPolicy {
    fn classify(&self, mastery: f64, review_count: u32) -> WordStatus {
        if mastery >= self.mastered_at {
            WordStatus::Mastered
        } else if mastery <= self.forgotten_at && review_count > self.forgotten_after_reviews {
            WordStatus::Forgotten
        } else {
            WordStatus::Learning
        }
    }
}

/// Classify with the default thresholds (90 / 30 / more than 3 reviews).
pub fn classify_status(mastery: f64, review_count: u32) -> WordStatus {
    ThresholdPolicy::default().classify(mastery, review_count)
}
