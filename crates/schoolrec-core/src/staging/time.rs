use chrono::{NaiveTime, Timelike};

use super::ValidationError;

/// Minutes since midnight for a 24-hour `HH:MM` wall-clock time.
pub fn to_minutes(time: &str) -> Result<u32, ValidationError> {
    let trimmed = time.trim();
    let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| ValidationError::InvalidTimeFormat(time.to_string()))?;
    Ok(parsed.hour() * 60 + parsed.minute())
}

/// Half-open interval overlap: `[a_from, a_to)` and `[b_from, b_to)` share
/// at least one minute.
pub fn overlaps(a_from: u32, a_to: u32, b_from: u32, b_to: u32) -> bool {
    a_from < b_to && b_from < a_to
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minutes() {
        assert_eq!(to_minutes("08:30").unwrap(), 510);
        assert_eq!(to_minutes("23:59").unwrap(), 1439);
        assert_eq!(to_minutes("00:00").unwrap(), 0);
        assert_eq!(to_minutes(" 13:05 ").unwrap(), 785);
    }

    #[test]
    fn test_to_minutes_rejects_malformed() {
        for bad in ["", "8", "08-30", "24:00", "12:60", "ab:cd", "08:30:00", "noon"] {
            assert!(
                matches!(to_minutes(bad), Err(ValidationError::InvalidTimeFormat(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_overlaps_is_half_open() {
        // 08:00-09:00 vs 08:30-09:30
        assert!(overlaps(480, 540, 510, 570));
        // touching at 09:00 is not an overlap
        assert!(!overlaps(480, 540, 540, 600));
        assert!(!overlaps(540, 600, 480, 540));
        // containment
        assert!(overlaps(480, 600, 500, 520));
    }
}
