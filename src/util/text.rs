// src/util/text.rs
use chrono::{DateTime, Datelike, TimeZone};

/// One-line preview of note content.
///
/// Whitespace runs (including newlines) collapse to single spaces, and text
/// longer than `max_chars` is cut on a character boundary and suffixed with `...`.
///
/// # Examples
///
/// ```
/// use notesync::util::text::preview;
///
/// assert_eq!(preview("Milk,\n  bread", 80), "Milk, bread");
/// assert_eq!(preview("abcdef", 3), "abc...");
/// ```
pub fn preview(content: &str, max_chars: usize) -> String {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(max_chars) {
        None => collapsed,
        Some((cut, _)) => format!("{}...", collapsed[..cut].trim_end()),
    }
}

/// Human label for how long ago `then` was, relative to `now`.
///
/// Both times are compared in their own zone, so callers convert to the
/// zone the user reads dates in.
pub fn relative_date<Tz: TimeZone>(then: &DateTime<Tz>, now: &DateTime<Tz>) -> String {
    let elapsed = now.clone().signed_duration_since(then.clone());
    let (then_day, today) = (then.date_naive(), now.date_naive());

    if elapsed.num_minutes() < 1 {
        "Just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if then_day == today {
        format!("{}h ago", elapsed.num_hours())
    } else if today.pred_opt() == Some(then_day) {
        "Yesterday".to_string()
    } else if then_day.year() == today.year() {
        then_day.format("%B %-d").to_string()
    } else {
        then_day.format("%B %-d, %Y").to_string()
    }
}
