use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DAILY_NEW_WORDS, DEFAULT_REVIEW_TIME};
use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyConfig {
    pub user_id: String,
    pub daily_new_words_count: u32,
    /// `HH:MM`; validated on update, parsed again whenever a window is built.
    pub review_time: String,
    /// Days on which new words are introduced.
    pub weekly_new_words_days: Vec<Weekday>,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            daily_new_words_count: DEFAULT_DAILY_NEW_WORDS,
            review_time: DEFAULT_REVIEW_TIME.to_string(),
            weekly_new_words_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
            utc_offset_minutes: 0,
        }
    }
}

impl StudyConfig {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    pub fn introduces_new_words_on(&self, weekday: Weekday) -> bool {
        self.weekly_new_words_days.contains(&weekday)
    }
}

impl Store {
    pub fn get_study_config(&self, user_id: &str) -> Result<StudyConfig, StoreError> {
        let key = keys::study_config_key(user_id)?;
        match self.study_configs.get(key.as_bytes())? {
            Some(raw) => Ok(Self::deserialize(&raw)?),
            None => Ok(StudyConfig::for_user(user_id)),
        }
    }

    /// Stores the config as given; callers validate it first (see `validation`).
    pub fn set_study_config(&self, config: &StudyConfig) -> Result<(), StoreError> {
        let key = keys::study_config_key(&config.user_id)?;
        self.study_configs
            .insert(key.as_bytes(), Self::serialize(config)?)?;
        Ok(())
    }

    pub fn list_study_configs(&self) -> Result<Vec<StudyConfig>, StoreError> {
        let mut configs = Vec::new();
        for item in self.study_configs.iter() {
            let (_, value) = item?;
            configs.push(Self::deserialize::<StudyConfig>(&value)?);
        }
        Ok(configs)
    }
}
