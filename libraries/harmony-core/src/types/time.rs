/// Format milliseconds as `m:ss` for progress labels
///
/// Zero renders as `0:00`; minutes are not capped.
pub fn format_millis(millis: u64) -> String {
    let total_seconds = millis / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_millis(0), "0:00");
        assert_eq!(format_millis(999), "0:00");
        assert_eq!(format_millis(5_000), "0:05");
        assert_eq!(format_millis(65_432), "1:05");
        assert_eq!(format_millis(3_600_000), "60:00");
    }
}
