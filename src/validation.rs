//! Input checks shared by the learning service and the study config store.

use crate::constants::MAX_DAILY_NEW_WORDS;
use crate::engine::window::utc_offset;
use crate::engine::{EngineError, ReviewTime};
use crate::store::operations::study_configs::StudyConfig;

/// 每日新词数必须在 1-100 之间
pub fn validate_daily_new_words(count: u32) -> Result<u32, EngineError> {
    if (1..=MAX_DAILY_NEW_WORDS).contains(&count) {
        Ok(count)
    } else {
        Err(EngineError::OutOfRangeInput {
            field: "daily_new_words_count",
            value: count.to_string(),
        })
    }
}

/// 复习时间格式必须为 HH:MM
pub fn validate_review_time(raw: &str) -> Result<ReviewTime, EngineError> {
    raw.parse()
}

pub fn validate_study_config(config: &StudyConfig) -> Result<(), EngineError> {
    validate_daily_new_words(config.daily_new_words_count)?;
    validate_review_time(&config.review_time)?;
    utc_offset(config.utc_offset_minutes)?;
    Ok(())
}
