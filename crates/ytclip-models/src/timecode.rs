//! Clock formatting and parsing for clip boundaries.
//!
//! Two renderings are used across the app:
//! - `MM:SS` for display and inline editing (minutes are not wrapped at 60)
//! - `HH:MM:SS` for downloader invocations

/// Placeholder shown when a boundary has not been set.
pub const UNSET_CLOCK: &str = "--:--";

/// Tool rendering of an unset boundary.
pub const UNSET_TOOL_CLOCK: &str = "00:00:00";

/// Truncate a position to whole seconds.
///
/// Returns `None` for absent or non-finite input. Negative positions clamp to zero.
fn whole_seconds(seconds: Option<f64>) -> Option<u64> {
    let seconds = seconds?;
    if !seconds.is_finite() {
        return None;
    }
    Some(seconds.max(0.0).floor() as u64)
}

/// Format a position as `MM:SS`.
///
/// # Examples
/// ```
/// use ytclip_models::timecode::format_clock;
/// assert_eq!(format_clock(Some(725.9)), "12:05");
/// assert_eq!(format_clock(Some(3725.0)), "62:05");
/// assert_eq!(format_clock(None), "--:--");
/// ```
pub fn format_clock(seconds: Option<f64>) -> String {
    match whole_seconds(seconds) {
        Some(total) => format!("{:02}:{:02}", total / 60, total % 60),
        None => UNSET_CLOCK.to_string(),
    }
}

/// Format a position as `HH:MM:SS` for `--download-sections`.
///
/// # Examples
/// ```
/// use ytclip_models::timecode::format_for_tool;
/// assert_eq!(format_for_tool(Some(3661.4)), "01:01:01");
/// assert_eq!(format_for_tool(None), "00:00:00");
/// ```
pub fn format_for_tool(seconds: Option<f64>) -> String {
    match whole_seconds(seconds) {
        Some(total) => format!(
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total % 3600) / 60,
            total % 60
        ),
        None => UNSET_TOOL_CLOCK.to_string(),
    }
}

/// Parse typed `MM:SS` text back to seconds.
///
/// Only `<digits>:<1-2 digits>` is accepted, with seconds in `0..=59`.
/// Minutes have no upper bound and need no padding. Anything else yields `None`.
///
/// # Examples
/// ```
/// use ytclip_models::timecode::parse_clock;
/// assert_eq!(parse_clock("12:05"), Some(725.0));
/// assert_eq!(parse_clock("12:5"), Some(725.0));
/// assert_eq!(parse_clock("12:60"), None);
/// ```
pub fn parse_clock(text: &str) -> Option<f64> {
    let (minutes, seconds) = text.split_once(':')?;

    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if seconds.is_empty() || seconds.len() > 2 || !seconds.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if seconds > 59 {
        return None;
    }

    let total = minutes.checked_mul(60)?.checked_add(seconds)?;
    Some(total as f64)
}

/// Keystroke filter for boundary edit fields: only digits and `:` may be typed.
pub fn is_clock_input(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit() || b == b':')
}
