//! Review digest worker
//! Hourly scan: when a user's review window is open, persist one digest per
//! local day with the number of words due by the window end, capped like the
//! due-review list the user is shown.

use chrono::{DateTime, Utc};

use crate::engine::window::utc_offset;
use crate::error::AppError;
use crate::learning::{window_for, LearningService};
use crate::store::operations::review_digests::ReviewDigest;
use crate::store::Store;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DigestSummary {
    pub written: u32,
    pub already_present: u32,
    pub outside_window: u32,
    pub invalid_config: u32,
}

pub async fn run(service: &LearningService<Store>) {
    tracing::info!("Review digest worker running");
    let summary = run_at(service, Utc::now());
    tracing::info!(
        written = summary.written,
        already_present = summary.already_present,
        outside_window = summary.outside_window,
        invalid_config = summary.invalid_config,
        "Review digest: finished"
    );
}

pub fn run_at(service: &LearningService<Store>, now: DateTime<Utc>) -> DigestSummary {
    let mut summary = DigestSummary::default();
    let store = service.store();

    let configs = match store.list_study_configs() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "Review digest: failed to list study configs");
            return summary;
        }
    };

    for config in &configs {
        let user_id = config.user_id.as_str();
        let local = utc_offset(config.utc_offset_minutes)
            .map_err(AppError::from)
            .and_then(|offset| {
                window_for(config, now).map(|w| (now.with_timezone(&offset).date_naive(), w))
            });
        let (date, window) = match local {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Review digest: invalid study config, skipping");
                summary.invalid_config += 1;
                continue;
            }
        };
        if !window.contains(now) {
            summary.outside_window += 1;
            continue;
        }

        match store.get_review_digest(user_id, date) {
            Ok(Some(_)) => {
                summary.already_present += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Review digest: failed to read digest");
                continue;
            }
        }

        let limit = service.due_review_limit();
        let due_count = match store.get_due_progress(user_id, window.end, limit) {
            Ok(rows) => rows.len() as u64,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Review digest: failed to scan due words");
                continue;
            }
        };

        let digest = ReviewDigest {
            user_id: user_id.to_string(),
            date,
            due_count,
            window_start: window.start,
            window_end: window.end,
            created_at: now,
        };
        match store.insert_review_digest(&digest) {
            Ok(true) => {
                tracing::debug!(user_id, %date, due_count, "Review digest written");
                summary.written += 1;
            }
            Ok(false) => summary.already_present += 1,
            Err(e) => tracing::warn!(user_id, error = %e, "Review digest: failed to insert"),
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::engine::{enroll, ThresholdPolicy};
    use crate::store::operations::study_configs::StudyConfig;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, h, m, 0).unwrap()
    }

    fn open_service() -> (TempDir, LearningService<Store>) {
        let dir = tempdir().expect("tempdir");
        let store = Store::open(dir.path().join("review_digest.sled").to_str().unwrap()).unwrap();
        let service = LearningService::new(Arc::new(store), ThresholdPolicy::default());
        (dir, service)
    }

    #[test]
    fn writes_one_digest_inside_window() {
        let (_dir, service) = open_service();
        let store = service.store();
        store.set_study_config(&StudyConfig::for_user("u1")).unwrap();
        let (progress, record) = enroll("u1", "w1", at(8, 0));
        store.enroll_progress(&progress, &record).unwrap();

        let early = run_at(&service, at(12, 0));
        assert_eq!(early.outside_window, 1);
        assert_eq!(early.written, 0);

        let first = run_at(&service, at(19, 0));
        assert_eq!(first.written, 1);
        let second = run_at(&service, at(20, 0));
        assert_eq!(second.written, 0);
        assert_eq!(second.already_present, 1);

        let digests = store.list_review_digests("u1").unwrap();
        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].due_count, 1);
        assert_eq!(digests[0].window_end, at(22, 0));
    }

    #[test]
    fn late_window_keeps_local_date() {
        let (_dir, service) = open_service();
        let store = service.store();
        let config = StudyConfig {
            review_time: "23:30".to_string(),
            ..StudyConfig::for_user("u1")
        };
        store.set_study_config(&config).unwrap();

        // 按当天窗口计算：11 日 00:30 时当天窗口尚未开始
        let summary = run_at(&service, at(0, 30) + Duration::days(1));
        assert_eq!(summary.outside_window, 1);

        let summary = run_at(&service, at(22, 0));
        assert_eq!(summary.written, 1);
        let digests = store.list_review_digests("u1").unwrap();
        assert_eq!(digests[0].date, chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn invalid_stored_review_time_is_skipped() {
        let (_dir, service) = open_service();
        let store = service.store();
        let broken = StudyConfig {
            review_time: "8pm".to_string(),
            ..StudyConfig::for_user("u1")
        };
        store.set_study_config(&broken).unwrap();
        store.set_study_config(&StudyConfig::for_user("u2")).unwrap();

        let summary = run_at(&service, at(20, 0));
        assert_eq!(summary.invalid_config, 1);
        assert_eq!(summary.written, 1);
        assert!(store.list_review_digests("u1").unwrap().is_empty());
    }

    #[test]
    fn due_count_is_capped_by_service_limit() {
        let (_dir, service) = open_service();
        let service = service.with_due_review_limit(2);
        let store = service.store();
        store.set_study_config(&StudyConfig::for_user("u1")).unwrap();
        for word in ["a", "b", "c"] {
            let (progress, record) = enroll("u1", word, at(8, 0));
            store.enroll_progress(&progress, &record).unwrap();
        }

        assert_eq!(run_at(&service, at(19, 0)).written, 1);
        assert_eq!(store.list_review_digests("u1").unwrap()[0].due_count, 2);
    }
}
