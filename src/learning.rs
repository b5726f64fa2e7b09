use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::constants::DEFAULT_DUE_REVIEW_LIMIT;
use crate::engine::window::utc_offset;
use crate::engine::{
    apply_attempt, enroll, review_window_at_offset, Attempt, AttemptKind, AttemptOutcome,
    Confidence, EngineError, ReviewWindow, ThresholdPolicy, WordProgress,
};
use crate::error::AppError;
use crate::store::operations::study_configs::StudyConfig;
use crate::store::ProgressStore;
use crate::validation::validate_study_config;

#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub progress: WordProgress,
    /// `false` when the pair was already enrolled and nothing was written.
    pub inserted: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DueReviews {
    pub window: ReviewWindow,
    pub in_window: bool,
    pub words: Vec<WordProgress>,
}

/// Partial study config update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyConfigUpdate {
    pub daily_new_words_count: Option<u32>,
    pub review_time: Option<String>,
    pub weekly_new_words_days: Option<Vec<Weekday>>,
    pub utc_offset_minutes: Option<i32>,
}

/// Learning flow over a `ProgressStore`: enrollment, attempts, due reviews.
///
/// Every operation takes `now` from the caller.
pub struct LearningService<S: ProgressStore> {
    store: Arc<S>,
    policy: ThresholdPolicy,
    due_review_limit: usize,
}

impl<S: ProgressStore> Clone for LearningService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
            due_review_limit: self.due_review_limit,
        }
    }
}

impl<S: ProgressStore> LearningService<S> {
    pub fn new(store: Arc<S>, policy: ThresholdPolicy) -> Self {
        Self {
            store,
            policy,
            due_review_limit: DEFAULT_DUE_REVIEW_LIMIT,
        }
    }

    /// Service configured from the environment: threshold policy and due limit.
    pub fn from_config(store: Arc<S>, config: &Config) -> Result<Self, EngineError> {
        let policy = config.policy.to_policy()?;
        Ok(Self::new(store, policy).with_due_review_limit(config.due_review_limit))
    }

    pub fn due_review_limit(&self) -> usize {
        self.due_review_limit
    }

    pub fn with_due_review_limit(mut self, limit: usize) -> Self {
        self.due_review_limit = limit;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    pub fn enroll_word(
        &self,
        user_id: &str,
        word_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Enrollment, AppError> {
        let (progress, record) = enroll(user_id, word_id, now);
        if self.store.insert_progress_if_absent(&progress, &record)? {
            tracing::debug!(user_id, word_id, "Word enrolled");
            return Ok(Enrollment {
                progress,
                inserted: true,
            });
        }

        // Lost to an earlier enrollment; report the row that won.
        let existing = self.store.load_progress(user_id, word_id)?.unwrap_or(progress);
        Ok(Enrollment {
            progress: existing,
            inserted: false,
        })
    }

    /// Enroll today's batch of new words. Empty on days without new words.
    pub fn enroll_daily_words(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<WordProgress>, AppError> {
        let config = self.store.load_study_config(user_id)?;
        let offset = utc_offset(config.utc_offset_minutes)?;
        let local_day = now.with_timezone(&offset).date_naive();

        if !config.introduces_new_words_on(local_day.weekday()) {
            tracing::debug!(user_id, day = %local_day, "No new words scheduled today");
            return Ok(Vec::new());
        }

        let candidates = self
            .store
            .candidate_new_words(user_id, config.daily_new_words_count as usize)?;
        let mut enrolled = Vec::with_capacity(candidates.len());
        for word_id in &candidates {
            let enrollment = self.enroll_word(user_id, word_id, now)?;
            if enrollment.inserted {
                enrolled.push(enrollment.progress);
            }
        }

        tracing::info!(
            user_id,
            day = %local_day,
            enrolled = enrolled.len(),
            "Daily new words enrolled"
        );
        Ok(enrolled)
    }

    /// Record one answer. `confidence` is the raw 1-5 rating from the caller.
    pub fn record_attempt(
        &self,
        user_id: &str,
        word_id: &str,
        is_correct: bool,
        confidence: u8,
        kind: AttemptKind,
        now: DateTime<Utc>,
    ) -> Result<AttemptOutcome, AppError> {
        let attempt = Attempt {
            is_correct,
            confidence: Confidence::new(confidence)?,
            kind,
        };
        self.submit_attempt(user_id, word_id, &attempt, now)
    }

    pub fn submit_attempt(
        &self,
        user_id: &str,
        word_id: &str,
        attempt: &Attempt,
        now: DateTime<Utc>,
    ) -> Result<AttemptOutcome, AppError> {
        let policy = &self.policy;
        let outcome = self.store.update_progress(user_id, word_id, |current| {
            apply_attempt(current, attempt, policy, now)
        })?;

        tracing::info!(
            user_id,
            word_id,
            is_correct = attempt.is_correct,
            confidence = attempt.confidence.value(),
            status = outcome.progress.status.as_str(),
            mastery = outcome.progress.mastery_score,
            review_count = outcome.progress.review_count,
            next_review_at = %outcome.progress.next_review_at,
            "Attempt recorded"
        );
        Ok(outcome)
    }

    /// Words due by the end of today's review window, or by `now` once the
    /// window has closed; earliest first.
    pub fn due_reviews(&self, user_id: &str, now: DateTime<Utc>) -> Result<DueReviews, AppError> {
        let config = self.store.load_study_config(user_id)?;
        let window = window_for(&config, now)?;
        let until = window.end.max(now);
        let words = self
            .store
            .list_due_progress(user_id, until, self.due_review_limit)?;

        Ok(DueReviews {
            window,
            in_window: window.contains(now),
            words,
        })
    }

    pub fn update_study_config(
        &self,
        user_id: &str,
        update: StudyConfigUpdate,
    ) -> Result<StudyConfig, AppError> {
        let mut config = self.store.load_study_config(user_id)?;
        if let Some(count) = update.daily_new_words_count {
            config.daily_new_words_count = count;
        }
        if let Some(review_time) = update.review_time {
            config.review_time = review_time;
        }
        if let Some(days) = update.weekly_new_words_days {
            config.weekly_new_words_days = days;
        }
        if let Some(minutes) = update.utc_offset_minutes {
            config.utc_offset_minutes = minutes;
        }

        validate_study_config(&config)?;
        self.store.save_study_config(&config)?;
        tracing::info!(user_id, review_time = %config.review_time, "Study config updated");
        Ok(config)
    }
}

/// Review window of the user's local day containing `now`.
pub fn window_for(config: &StudyConfig, now: DateTime<Utc>) -> Result<ReviewWindow, AppError> {
    let offset = utc_offset(config.utc_offset_minutes)?;
    let local_day = now.with_timezone(&offset).date_naive();
    Ok(review_window_at_offset(local_day, &config.review_time, offset)?)
}
