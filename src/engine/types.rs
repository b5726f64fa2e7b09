use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mastery::Confidence;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    New,
    Learning,
    Mastered,
    Forgotten,
}

impl WordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Mastered => "mastered",
            Self::Forgotten => "forgotten",
        }
    }
}

/// Scheduling state of one (user, word) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordProgress {
    pub user_id: String,
    pub word_id: String,
    pub status: WordStatus,
    pub mastery_score: f64,
    pub review_count: u32,
    pub next_review_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    NewWord,
    Review,
    Test,
    Mastered,
}

/// How an attempt was collected; decides the audit action type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttemptKind {
    #[default]
    Review,
    Test,
}

impl From<AttemptKind> for ActionType {
    fn from(kind: AttemptKind) -> Self {
        match kind {
            AttemptKind::Review => Self::Review,
            AttemptKind::Test => Self::Test,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub is_correct: bool,
    pub confidence: Confidence,
    #[serde(default)]
    pub kind: AttemptKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RecordResult {
    Started,
    #[serde(rename_all = "camelCase")]
    Attempt {
        is_correct: bool,
        confidence: Confidence,
        mastery_score: f64,
        status: WordStatus,
        next_review_at: DateTime<Utc>,
    },
}

/// Append-only audit entry; written alongside every progress change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearningRecord {
    pub id: String,
    pub user_id: String,
    pub word_id: String,
    pub action_type: ActionType,
    pub result: RecordResult,
    pub created_at: DateTime<Utc>,
}
