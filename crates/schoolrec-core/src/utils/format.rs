/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring match, used by searchable dropdowns
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format a backend timestamp as a short date
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        // YYYY-MM-DD prefix
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// "08:00 - 09:00", with blanks for missing ends
pub fn format_time_range(from: Option<&str>, to: Option<&str>) -> String {
    format!("{} - {}", from.unwrap_or(""), to.unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Math | 08:00 - 09:00", "math"));
        assert!(contains_ignore_case("Science", ""));
        assert!(!contains_ignore_case("Science", "art"));
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-06-03T08:15:00.000Z"), "Jun 03, 2025");
        assert_eq!(format_date("2025-06-03"), "2025-06-03");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_format_time_range() {
        assert_eq!(format_time_range(Some("08:00"), Some("09:00")), "08:00 - 09:00");
        assert_eq!(format_time_range(None, Some("09:00")), " - 09:00");
    }
}
