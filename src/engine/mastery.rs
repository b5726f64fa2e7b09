use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIDENCE_MAX, CONFIDENCE_MIN, CORRECT_GAIN_PER_CONFIDENCE, MASTERY_MAX, MASTERY_MIN,
    WRONG_PENALTY_PER_CONFIDENCE,
};

use super::EngineError;

/// Self-reported certainty of an answer, always within 1..=5.
///
/// Out-of-range values are rejected here, so the updater itself never sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub fn new(value: u8) -> Result<Self, EngineError> {
        if (CONFIDENCE_MIN..=CONFIDENCE_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EngineError::out_of_range("confidence", value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Confidence {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for u8 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

/// Clamp a score into [0, 100]; NaN collapses to 0.
pub fn clamp_mastery(score: f64) -> f64 {
    if score.is_nan() {
        return MASTERY_MIN;
    }
    score.clamp(MASTERY_MIN, MASTERY_MAX)
}

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// New mastery score after one attempt.
///
/// Wrong answers cost 8 points per confidence level, correct answers gain 5.
pub fn update_mastery(current: f64, is_correct: bool, confidence: Confidence) -> f64 {
    let level = f64::from(confidence.value());
    let delta = if is_correct {
        level * CORRECT_GAIN_PER_CONFIDENCE
    } else {
        -level * WRONG_PENALTY_PER_CONFIDENCE
    };

    round2(clamp_mastery(clamp_mastery(current) + delta))
}
