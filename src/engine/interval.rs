use crate::constants::INTERVAL_TABLE_MINUTES;

/// Base review delay in minutes for the given attempt count.
///
/// Counts past the end of the table reuse its last entry.
pub fn delay_for(review_count: u32) -> i64 {
    let last = INTERVAL_TABLE_MINUTES.len() - 1;
    let index = (review_count as usize).min(last);
    INTERVAL_TABLE_MINUTES[index]
}

/// Number of attempts covered by the fixed table.
pub fn table_len() -> u32 {
    INTERVAL_TABLE_MINUTES.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_entries_are_returned_in_order() {
        let expected = [5, 30, 720, 1440, 2880, 5760, 10080, 21600];
        for (count, minutes) in expected.iter().enumerate() {
            assert_eq!(delay_for(count as u32), *minutes);
        }
    }

    #[test]
    fn counts_past_table_are_clamped() {
        assert_eq!(delay_for(8), 21600);
        assert_eq!(delay_for(50), 21600);
        assert_eq!(delay_for(u32::MAX), 21600);
    }

    #[test]
    fn table_never_decreases() {
        for count in 0..20 {
            assert!(delay_for(count) <= delay_for(count + 1));
        }
        assert_eq!(table_len(), 8);
    }
}
