use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::REVIEW_WINDOW_HALF_WIDTH_HOURS;

use super::EngineError;

/// A daily review time of day, written `HH:MM` (24-hour clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReviewTime(NaiveTime);

impl ReviewTime {
    pub fn time(self) -> NaiveTime {
        self.0
    }
}

impl FromStr for ReviewTime {
    type Err = EngineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| EngineError::invalid_config("review_time", raw, reason);

        let bytes = raw.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid("expected HH:MM"));
        }
        let digits_ok = bytes[..2]
            .iter()
            .chain(bytes[3..].iter())
            .all(u8::is_ascii_digit);
        if !digits_ok {
            return Err(invalid("expected HH:MM"));
        }

        let hours: u32 = raw[..2].parse().map_err(|_| invalid("expected HH:MM"))?;
        let minutes: u32 = raw[3..].parse().map_err(|_| invalid("expected HH:MM"))?;
        NaiveTime::from_hms_opt(hours, minutes, 0)
            .map(Self)
            .ok_or_else(|| invalid("hour must be 00-23 and minute 00-59"))
    }
}

impl fmt::Display for ReviewTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Closed interval `[start, end]` of the day's review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReviewWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Review window for `day`, anchored on `review_time` in UTC.
pub fn review_window(day: NaiveDate, review_time: &str) -> Result<ReviewWindow, EngineError> {
    review_window_at_offset(day, review_time, utc_offset(0)?)
}

/// Review window for `day` with `review_time` read as local time at `offset`.
pub fn review_window_at_offset(
    day: NaiveDate,
    review_time: &str,
    offset: FixedOffset,
) -> Result<ReviewWindow, EngineError> {
    let time: ReviewTime = review_time.parse()?;
    let local = day.and_time(time.time());
    let anchor = Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(offset.local_minus_utc()))));
    let half_width = Duration::hours(REVIEW_WINDOW_HALF_WIDTH_HOURS);

    Ok(ReviewWindow {
        start: anchor - half_width,
        end: anchor + half_width,
    })
}

/// Fixed UTC offset from minutes east of UTC; must be strictly within +/-24h.
pub fn utc_offset(minutes: i32) -> Result<FixedOffset, EngineError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            EngineError::invalid_config("utc_offset_minutes", minutes, "must be within +/-24h")
        })
}
