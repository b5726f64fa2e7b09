use chrono::{DateTime, Utc};

use super::mastery::update_mastery;
use super::scheduler::{schedule_enrollment, schedule_next};
use super::status::ClassificationPolicy;
use super::types::*;

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    pub progress: WordProgress,
    pub record: LearningRecord,
}

fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fresh progress row for a word entering the user's set, plus its audit entry.
pub fn enroll(user_id: &str, word_id: &str, now: DateTime<Utc>) -> (WordProgress, LearningRecord) {
    let progress = WordProgress {
        user_id: user_id.to_string(),
        word_id: word_id.to_string(),
        status: WordStatus::New,
        mastery_score: 0.0,
        review_count: 0,
        next_review_at: schedule_enrollment(now),
        created_at: now,
        updated_at: now,
    };
    let record = LearningRecord {
        id: new_record_id(),
        user_id: user_id.to_string(),
        word_id: word_id.to_string(),
        action_type: ActionType::NewWord,
        result: RecordResult::Started,
        created_at: now,
    };
    (progress, record)
}

/// Run one attempt through updater, classifier and scheduler.
///
/// The classifier sees the count including this attempt; the scheduler sees
/// the count going into it.
pub fn apply_attempt(
    progress: &WordProgress,
    attempt: &Attempt,
    policy: &dyn ClassificationPolicy,
    now: DateTime<Utc>,
) -> AttemptOutcome {
    let mastery_score = update_mastery(progress.mastery_score, attempt.is_correct, attempt.confidence);
    let review_count = progress.review_count.saturating_add(1);
    let status = policy.classify(mastery_score, review_count);
    let next_review_at = schedule_next(progress.review_count, mastery_score, now);

    let action_type = if status == WordStatus::Mastered && progress.status != WordStatus::Mastered {
        ActionType::Mastered
    } else {
        attempt.kind.into()
    };

    let updated = WordProgress {
        status,
        mastery_score,
        review_count,
        next_review_at,
        updated_at: now,
        ..progress.clone()
    };
    let record = LearningRecord {
        id: new_record_id(),
        user_id: progress.user_id.clone(),
        word_id: progress.word_id.clone(),
        action_type,
        result: RecordResult::Attempt {
            is_correct: attempt.is_correct,
            confidence: attempt.confidence,
            mastery_score,
            status,
            next_review_at,
        },
        created_at: now,
    };

    AttemptOutcome {
        progress: updated,
        record,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::engine::mastery::Confidence;
    use crate::engine::status::ThresholdPolicy;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn attempt(is_correct: bool, confidence: u8) -> Attempt {
        Attempt {
            is_correct,
            confidence: Confidence::new(confidence).unwrap(),
            kind: AttemptKind::Review,
        }
    }

    #[test]
    fn enrollment_starts_new_and_due_in_five_minutes() {
        let (progress, record) = enroll("u1", "w1", t0());
        assert_eq!(progress.status, WordStatus::New);
        assert_eq!(progress.review_count, 0);
        assert_eq!(progress.mastery_score, 0.0);
        assert_eq!(progress.next_review_at, t0() + Duration::minutes(5));
        assert_eq!(record.action_type, ActionType::NewWord);
        assert_eq!(record.result, RecordResult::Started);
    }

    #[test]
    fn first_attempt_moves_to_learning() {
        let (progress, _) = enroll("u1", "w1", t0());
        let now = t0() + Duration::minutes(6);
        let out = apply_attempt(&progress, &attempt(true, 3), &ThresholdPolicy::default(), now);

        assert_eq!(out.progress.status, WordStatus::Learning);
        assert_eq!(out.progress.mastery_score, 15.0);
        assert_eq!(out.progress.review_count, 1);
        assert_eq!(out.progress.next_review_at, now + Duration::minutes(5));
        assert_eq!(out.progress.updated_at, now);
        assert_eq!(out.progress.created_at, t0());
        assert_eq!(out.record.action_type, ActionType::Review);
    }

    #[test]
    fn reaching_mastered_is_recorded_once() {
        let policy = ThresholdPolicy::default();
        let (mut progress, _) = enroll("u1", "w1", t0());
        progress.mastery_score = 80.0;
        progress.review_count = 4;
        progress.status = WordStatus::Learning;

        let first = apply_attempt(&progress, &attempt(true, 2), &policy, t0());
        assert_eq!(first.progress.status, WordStatus::Mastered);
        assert_eq!(first.record.action_type, ActionType::Mastered);

        let second = apply_attempt(&first.progress, &attempt(true, 2), &policy, t0());
        assert_eq!(second.progress.status, WordStatus::Mastered);
        assert_eq!(second.record.action_type, ActionType::Review);
    }

    #[test]
    fn mastered_word_can_regress_to_forgotten() {
        let policy = ThresholdPolicy::default();
        let (mut progress, _) = enroll("u1", "w1", t0());
        progress.mastery_score = 90.0;
        progress.review_count = 6;
        progress.status = WordStatus::Mastered;

        let once = apply_attempt(&progress, &attempt(false, 5), &policy, t0());
        assert_eq!(once.progress.mastery_score, 50.0);
        assert_eq!(once.progress.status, WordStatus::Learning);

        let twice = apply_attempt(&once.progress, &attempt(false, 5), &policy, t0());
        assert_eq!(twice.progress.mastery_score, 10.0);
        assert_eq!(twice.progress.status, WordStatus::Forgotten);
    }

    #[test]
    fn classifier_counts_the_current_attempt() {
        let policy = ThresholdPolicy::default();
        let (mut progress, _) = enroll("u1", "w1", t0());
        progress.review_count = 3;
        progress.status = WordStatus::Learning;

        // Fourth attempt: review_count becomes 4 (> 3), score stays low.
        let out = apply_attempt(&progress, &attempt(false, 1), &policy, t0());
        assert_eq!(out.progress.review_count, 4);
        assert_eq!(out.progress.status, WordStatus::Forgotten);
        // Scheduler still indexes the slot by the incoming count.
        assert_eq!(out.progress.next_review_at, t0() + Duration::minutes(1440));
    }

    #[test]
    fn test_attempts_are_recorded_as_tests() {
        let (progress, _) = enroll("u1", "w1", t0());
        let mut input = attempt(false, 2);
        input.kind = AttemptKind::Test;
        let out = apply_attempt(&progress, &input, &ThresholdPolicy::default(), t0());
        assert_eq!(out.record.action_type, ActionType::Test);
        match out.record.result {
            RecordResult::Attempt {
                is_correct,
                mastery_score,
                ..
            } => {
                assert!(!is_correct);
                assert_eq!(mastery_score, 0.0);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
