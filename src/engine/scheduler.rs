use chrono::{DateTime, Duration, Utc};

use crate::constants::{MASTERY_MAX, MILLIS_PER_MINUTE};

use super::interval::{delay_for, table_len};
use super::mastery::clamp_mastery;

/// Next due time for a word.
///
/// `review_count` is the count going into the attempt (before incrementing),
/// so the first attempt after enrollment uses the 5 minute slot. Once the
/// fixed table is exhausted the last delay is stretched by `1 + mastery/100`.
pub fn schedule_next(review_count: u32, mastery: f64, now: DateTime<Utc>) -> DateTime<Utc> {
    if review_count < table_len() {
        return now + Duration::minutes(delay_for(review_count));
    }

    let base_minutes = delay_for(table_len() - 1) as f64;
    let adjustment = 1.0 + clamp_mastery(mastery) / MASTERY_MAX;
    let millis = (base_minutes * adjustment * MILLIS_PER_MINUTE as f64).round() as i64;
    now + Duration::milliseconds(millis)
}

/// First due time of a freshly enrolled word.
pub fn schedule_enrollment(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(delay_for(0))
}
