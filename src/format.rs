use chrono::{DateTime, Local, Timelike};

/// Shown in place of a best record that has never been set.
pub const UNSET_RECORD: &str = "--:--:--";

/// Formats a millisecond duration as zero-padded `HH:MM:SS`.
///
/// Truncates to whole seconds. Hours do not roll over into days, so values
/// above 24 hours render as e.g. `25:00:00`.
pub fn format_elapsed(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Formats a best record, or the unset placeholder.
pub fn format_best(best: Option<u64>) -> String {
    match best {
        Some(ms) => format_elapsed(ms),
        None => UNSET_RECORD.to_string(),
    }
}

/// Formats the wall clock in 12-hour `H:MM AM/PM` form for the status line.
pub fn format_wall_clock(now: DateTime<Local>) -> String {
    let (pm, hour12) = now.hour12();
    format!(
        "{}:{:02} {}",
        hour12,
        now.minute(),
        if pm { "PM" } else { "AM" }
    )
}
