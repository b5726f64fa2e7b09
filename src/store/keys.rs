use chrono::NaiveDate;

use crate::store::StoreError;

const SEP: char = ':';

/// Key components must be non-empty and free of the separator.
fn component<'a>(field: &str, value: &'a str) -> Result<&'a str, StoreError> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    if value.contains(SEP) {
        return Err(StoreError::Validation(format!(
            "{field} must not contain '{SEP}': {value}"
        )));
    }
    Ok(value)
}

// Progress keys
pub fn progress_key(user_id: &str, word_id: &str) -> Result<String, StoreError> {
    Ok(format!(
        "{}:{}",
        component("user_id", user_id)?,
        component("word_id", word_id)?
    ))
}

pub fn progress_prefix(user_id: &str) -> Result<String, StoreError> {
    Ok(format!("{}:", component("user_id", user_id)?))
}

// Due index keys: `{user_id}:{due_ms:020}:{word_id}`, ascending by due time
pub fn due_index_key(user_id: &str, due_ts_ms: i64, word_id: &str) -> Result<String, StoreError> {
    let ts = due_ts_ms.max(0) as u64;
    Ok(format!(
        "{}:{:020}:{}",
        component("user_id", user_id)?,
        ts,
        component("word_id", word_id)?
    ))
}

pub fn due_index_prefix(user_id: &str) -> Result<String, StoreError> {
    progress_prefix(user_id)
}

pub fn parse_due_index_key(key: &[u8]) -> Option<(i64, String)> {
    let text = std::str::from_utf8(key).ok()?;
    let mut parts = text.splitn(3, SEP);
    let _user = parts.next()?;
    let ts = parts.next()?.parse::<u64>().ok()?;
    let word_id = parts.next()?;
    if word_id.is_empty() {
        return None;
    }
    Some((i64::try_from(ts).ok()?, word_id.to_string()))
}

// Record keys: newest first per user
pub fn record_key(user_id: &str, timestamp_ms: i64, record_id: &str) -> Result<String, StoreError> {
    let ts = timestamp_ms.max(0) as u64;
    let reverse_ts = u64::MAX - ts;
    Ok(format!(
        "{}:{:020}:{}",
        component("user_id", user_id)?,
        reverse_ts,
        component("record_id", record_id)?
    ))
}

pub fn record_prefix(user_id: &str) -> Result<String, StoreError> {
    progress_prefix(user_id)
}

/// Parse timestamp (ms) from a record key formatted as `{user_id}:{reverse_ts:020}:{record_id}`.
pub fn parse_record_timestamp_ms(record_key: &[u8]) -> Option<i64> {
    let first_sep = record_key.iter().position(|b| *b == b':')?;
    let tail = &record_key[first_sep + 1..];
    let second_sep = tail.iter().position(|b| *b == b':')?;
    let reverse_ts = std::str::from_utf8(&tail[..second_sep]).ok()?.parse::<u64>().ok()?;
    let ts_u64 = u64::MAX.checked_sub(reverse_ts)?;
    i64::try_from(ts_u64).ok()
}

// Study config keys
pub fn study_config_key(user_id: &str) -> Result<String, StoreError> {
    Ok(component("user_id", user_id)?.to_string())
}

// Word catalog keys
pub fn word_key(word_id: &str) -> Result<String, StoreError> {
    Ok(component("word_id", word_id)?.to_string())
}

pub fn words_by_rank_key(rank: u32, word_id: &str) -> Result<String, StoreError> {
    Ok(format!("{:010}:{}", rank, component("word_id", word_id)?))
}

// Review digest keys
pub fn review_digest_key(user_id: &str, date: NaiveDate) -> Result<String, StoreError> {
    Ok(format!(
        "{}:{}",
        component("user_id", user_id)?,
        date.format("%Y-%m-%d")
    ))
}

pub fn review_digest_prefix(user_id: &str) -> Result<String, StoreError> {
    progress_prefix(user_id)
}
