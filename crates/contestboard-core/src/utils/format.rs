use chrono::{DateTime, TimeZone};

/// Case-insensitive substring test.
/// `needle` must already be lowercased.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(needle)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Keep the first `max_chars` characters and append "..." when anything was cut.
pub fn shorten(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

/// Format a duration as "H hours M minutes".
///
/// The minutes clause is dropped when it is zero but the space before it
/// stays, so 7200 seconds renders as "2 hours ".
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let minutes_text = if minutes != 0 {
        format!("{} minutes", minutes)
    } else {
        String::new()
    };
    format!("{} hours {}", hours, minutes_text)
}

/// Format a start time (seconds since epoch) like "17 Jan 2025, 14:35".
pub fn format_start_time<Tz: TimeZone>(seconds: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp(seconds, 0) {
        Some(utc) => utc
            .with_timezone(tz)
            .format("%d %b %Y, %H:%M")
            .to_string(),
        None => "TBD".to_string(),
    }
}
