//! Clock-style time parsing and formatting
//!
//! The playback engine reports track times as `M:SS` or `H:MM:SS`. These
//! helpers convert between that form and whole seconds.

/// Parse a clock-style duration into whole seconds.
///
/// Accepts `M:SS` and `H:MM:SS`. Any other shape (no colon, too many
/// fields, non-numeric fields, a total that overflows) yields `None`.
///
/// # Examples
///
/// ```
/// use duodeck_common::human_time::parse_clock;
///
/// assert_eq!(parse_clock("0:26"), Some(26));
/// assert_eq!(parse_clock("3:40"), Some(220));
/// assert_eq!(parse_clock("1:01:01"), Some(3661));
/// assert_eq!(parse_clock("26"), None);
/// assert_eq!(parse_clock("n/a"), None);
/// ```
pub fn parse_clock(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut fields = Vec::with_capacity(3);
    for part in text.split(':') {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        fields.push(part.parse::<u64>().ok()?);
    }

    match fields.as_slice() {
        [minutes, seconds] => minutes.checked_mul(60)?.checked_add(*seconds),
        [hours, minutes, seconds] => hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(*seconds),
        _ => None,
    }
}

/// Format whole seconds as `M:SS` (or `H:MM:SS` from one hour up).
///
/// # Examples
///
/// ```
/// use duodeck_common::human_time::format_clock;
///
/// assert_eq!(format_clock(26), "0:26");
/// assert_eq!(format_clock(220), "3:40");
/// assert_eq!(format_clock(3661), "1:01:01");
/// ```
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}
