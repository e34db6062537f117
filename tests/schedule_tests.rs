use chrono::{DateTime, Duration, Local, TimeZone};
use tictask::models::BreakWindow;
use tictask::schedule::{parse_clock, BreakSchedule};

fn on(day: u32, h: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, day, h, min, 0).unwrap()
}

fn schedule(windows: &[(&str, &str, &str)]) -> BreakSchedule {
    let windows: Vec<BreakWindow> = windows
        .iter()
        .map(|(s, e, n)| BreakWindow::new(s, e, n))
        .collect();
    BreakSchedule::from_windows(&windows)
}

#[test]
fn parse_clock_accepts_hh_mm_only() {
    assert_eq!(parse_clock("00:00"), Some(0));
    assert_eq!(parse_clock("07:30"), Some(450));
    assert_eq!(parse_clock("23:59"), Some(1439));
    assert_eq!(parse_clock("24:00"), None);
    assert_eq!(parse_clock("12:60"), None);
    assert_eq!(parse_clock("noon"), None);
    assert_eq!(parse_clock("12"), None);
    assert_eq!(parse_clock(""), None);
}

#[test]
fn same_day_window_bounds() {
    let s = schedule(&[("09:00", "10:00", "Free Time")]);
    assert!(s.query(on(18, 8, 59)).is_none());
    // Start inclusive, end exclusive.
    assert!(s.query(on(18, 9, 0)).is_some());
    assert!(s.query(on(18, 9, 30)).is_some());
    assert!(s.query(on(18, 10, 0)).is_none());
}

#[test]
fn midnight_crossing_window_matches_both_sides() {
    let s = schedule(&[("23:00", "01:00", "Night")]);

    // 23:30 falls in the instance starting that evening...
    let evening = s.query(on(18, 23, 30)).expect("23:30 is inside");
    assert_eq!(evening.start, on(18, 23, 0));
    assert_eq!(evening.end, on(19, 1, 0));

    // ...and 00:30 the next calendar day falls in the same instance.
    let after_midnight = s.query(on(19, 0, 30)).expect("00:30 is inside");
    assert_eq!(after_midnight.start, on(18, 23, 0));
    assert_eq!(after_midnight.end, on(19, 1, 0));

    assert!(s.query(on(18, 12, 0)).is_none());
    assert!(s.query(on(19, 1, 0)).is_none());
}

#[test]
fn zero_length_window_is_never_active() {
    let s = schedule(&[("09:00", "09:00", "Degenerate")]);
    assert!(s.query(on(18, 9, 0)).is_none());
    assert_eq!(s.total_overlap(on(18, 0, 0), on(19, 0, 0)), 0);
}

#[test]
fn malformed_windows_are_skipped_not_fatal() {
    let s = schedule(&[("9am", "10am", "Bad"), ("25:00", "26:00", "Worse")]);
    assert!(s.is_empty());
    assert!(s.query(on(18, 9, 30)).is_none());
    assert_eq!(s.total_overlap(on(18, 0, 0), on(19, 0, 0)), 0);
}

#[test]
fn earlier_declared_window_wins_overlaps() {
    let s = schedule(&[
        ("09:00", "11:00", "First"),
        ("10:00", "12:00", "Second"),
    ]);
    assert_eq!(s.query(on(18, 10, 30)).unwrap().name, "First");
    assert_eq!(s.query(on(18, 11, 30)).unwrap().name, "Second");
}

#[test]
fn instance_countdown_values() {
    let s = schedule(&[("23:00", "01:00", "Night")]);
    let now = on(18, 23, 30);
    let b = s.query(now).unwrap();
    assert_eq!(b.remaining_ms(now), 90 * 60 * 1000);
    assert!((b.fraction_remaining(now) - 0.75).abs() < 1e-9);
    // Past the end, both bottom out at zero.
    let past = on(19, 2, 0);
    assert_eq!(b.remaining_ms(past), 0);
    assert_eq!(b.fraction_remaining(past), 0.0);
}

#[test]
fn total_overlap_within_one_day() {
    let s = schedule(&[("12:00", "13:00", "Lunch")]);
    let hour = 3600 * 1000;
    assert_eq!(s.total_overlap(on(18, 11, 0), on(18, 14, 0)), hour);
    // Span entirely inside the window.
    assert_eq!(s.total_overlap(on(18, 12, 15), on(18, 12, 45)), hour / 2);
    // Span touching only an edge.
    assert_eq!(s.total_overlap(on(18, 13, 0), on(18, 14, 0)), 0);
    // Inverted span is empty.
    assert_eq!(s.total_overlap(on(18, 14, 0), on(18, 11, 0)), 0);
}

#[test]
fn total_overlap_sums_daily_instances_across_days() {
    let s = schedule(&[("12:00", "13:00", "Lunch")]);
    let hour: u64 = 3600 * 1000;
    // A multi-day gap hits one instance per day.
    assert_eq!(s.total_overlap(on(16, 11, 0), on(18, 14, 0)), 3 * hour);
}

#[test]
fn total_overlap_handles_midnight_crossing_instances() {
    let s = schedule(&[("23:00", "01:00", "Night")]);
    let hour: u64 = 3600 * 1000;
    assert_eq!(s.total_overlap(on(18, 22, 0), on(19, 2, 0)), 2 * hour);
    // Only the tail after midnight.
    assert_eq!(s.total_overlap(on(19, 0, 0), on(19, 2, 0)), hour);
    // Only the head before midnight.
    assert_eq!(s.total_overlap(on(18, 22, 0), on(18, 23, 30)), hour / 2);
}

#[test]
fn overlapping_windows_count_once_toward_overlap() {
    // The live tick suspends the clock once across the union of the two
    // windows, so the deduction is the union, not the sum.
    let s = schedule(&[
        ("09:00", "11:00", "First"),
        ("10:00", "12:00", "Second"),
    ]);
    let hour: u64 = 3600 * 1000;
    assert_eq!(s.total_overlap(on(18, 9, 0), on(18, 12, 0)), 3 * hour);
    assert_eq!(s.total_overlap(on(18, 8, 0), on(18, 13, 0)), 3 * hour);
}

#[test]
fn empty_schedule_is_inert() {
    let s = schedule(&[]);
    assert!(s.is_empty());
    assert!(s.query(on(18, 12, 0)).is_none());
    assert_eq!(s.total_overlap(on(18, 0, 0), on(19, 0, 0)), 0);
}

#[test]
fn default_break_times_all_parse() {
    let s = BreakSchedule::from_windows(&tictask::models::default_break_times());
    assert!(!s.is_empty());
    // The evening window crosses midnight: 19:00 on one day, 00:15 the next.
    assert!(s.query(on(18, 19, 30)).is_some());
    assert!(s.query(on(19, 0, 15)).is_some());
    assert!(s.query(on(18, 15, 0)).is_none());
}

#[test]
fn overlap_and_query_agree_on_long_spans() {
    let s = schedule(&[("23:00", "01:00", "Night")]);
    // Walk a two-day span in 15-minute steps; the summed in-break steps must
    // equal the computed overlap.
    let start = on(17, 12, 0);
    let end = on(19, 12, 0);
    let step = Duration::minutes(15);
    let mut probe = start;
    let mut counted: u64 = 0;
    while probe < end {
        if s.query(probe).is_some() {
            counted += step.num_milliseconds() as u64;
        }
        probe += step;
    }
    assert_eq!(s.total_overlap(start, end), counted);
}
