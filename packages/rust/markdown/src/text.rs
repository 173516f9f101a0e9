//! Small text helpers shared by the index, feed, and archive writers.

use chrono::{DateTime, Utc};

/// Returned by [`format_time`] when there is no timestamp to format.
pub const UNKNOWN_TIME: &str = "unknown time";

/// Appended to summary lines cut at the length limit.
pub const ELLIPSIS: &str = "...";

/// Fixed-width `YYYY-MM-DD` date, or [`UNKNOWN_TIME`] when `ts` is absent.
pub fn format_time(ts: Option<&DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d").to_string(),
        None => UNKNOWN_TIME.to_string(),
    }
}

/// Fixed-width `YYYY-MM-DD HH:MM:SS` date-time.
pub fn format_datetime(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Turn an issue title into a safe file name fragment.
///
/// Path separators become `-`, spaces become `.`, and anything else that is
/// not alphanumeric or one of `. - _` is dropped. Applying it twice changes nothing.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' => Some('-'),
            ' ' => Some('.'),
            c if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            _ => None,
        })
        .collect()
}

/// Drop characters XML 1.0 cannot carry: controls other than tab/LF/CR, and U+FFFE/U+FFFF.
///
/// Surrogate code points cannot occur in a Rust `str`, so they need no handling here.
pub fn filter_valid_text(body: &str) -> String {
    body.chars().filter(|&c| is_valid_xml_char(c)).collect()
}

fn is_valid_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

/// First `max_lines` non-blank lines of `body`, heading markers stripped and
/// each cut to `max_len` characters plus [`ELLIPSIS`].
pub fn summarize(body: Option<&str>, max_lines: usize, max_len: usize) -> Vec<String> {
    let Some(body) = body else {
        return Vec::new();
    };

    body.lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .filter(|line| !line.is_empty())
        .take(max_lines)
        .map(|line| truncate(line, max_len))
        .collect()
}

fn truncate(line: &str, max_len: usize) -> String {
    match line.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &line[..cut]),
        None => line.to_string(),
    }
}
