use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_DUE_REVIEW_LIMIT, DEFAULT_FORGOTTEN_AFTER_REVIEWS, DEFAULT_FORGOTTEN_THRESHOLD,
    DEFAULT_MASTERED_THRESHOLD,
};
use crate::engine::{EngineError, ThresholdPolicy};

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub due_review_limit: usize,
    pub worker: WorkerConfig,
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub enable_review_digest: bool,
}

/// Raw status thresholds; turned into a `ThresholdPolicy` only after validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyConfig {
    pub mastered_threshold: f64,
    pub forgotten_threshold: f64,
    pub forgotten_after_reviews: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mastered_threshold: DEFAULT_MASTERED_THRESHOLD,
            forgotten_threshold: DEFAULT_FORGOTTEN_THRESHOLD,
            forgotten_after_reviews: DEFAULT_FORGOTTEN_AFTER_REVIEWS,
        }
    }
}

impl PolicyConfig {
    pub fn to_policy(&self) -> Result<ThresholdPolicy, EngineError> {
        ThresholdPolicy::new(
            self.mastered_threshold,
            self.forgotten_threshold,
            self.forgotten_after_reviews,
        )
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/review.sled"),
            due_review_limit: env_or_parse("DUE_REVIEW_LIMIT", DEFAULT_DUE_REVIEW_LIMIT),
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                enable_review_digest: env_or_bool("ENABLE_REVIEW_DIGEST_WORKER", true),
            },
            policy: PolicyConfig {
                mastered_threshold: env_or_parse("MASTERED_THRESHOLD", DEFAULT_MASTERED_THRESHOLD),
                forgotten_threshold: env_or_parse(
                    "FORGOTTEN_THRESHOLD",
                    DEFAULT_FORGOTTEN_THRESHOLD,
                ),
                forgotten_after_reviews: env_or_parse(
                    "FORGOTTEN_AFTER_REVIEWS",
                    DEFAULT_FORGOTTEN_AFTER_REVIEWS,
                ),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
