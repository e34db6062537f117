use tictask::format::{format_best, format_elapsed, UNSET_RECORD};

#[test]
fn formats_zero_padded_hms() {
    assert_eq!(format_elapsed(0), "00:00:00");
    assert_eq!(format_elapsed(1000), "00:00:01");
    assert_eq!(format_elapsed(61_000), "00:01:01");
    assert_eq!(format_elapsed(3_661_000), "01:01:01");
}

#[test]
fn truncates_to_whole_seconds() {
    assert_eq!(format_elapsed(999), "00:00:00");
    assert_eq!(format_elapsed(1_999), "00:00:01");
}

#[test]
fn hours_do_not_roll_over_into_days() {
    // 25h 01m 01s
    assert_eq!(format_elapsed(90_061_000), "25:01:01");
    assert_eq!(format_elapsed(360_000_000), "100:00:00");
}

#[test]
fn best_record_uses_the_unset_placeholder() {
    assert_eq!(format_best(None), UNSET_RECORD);
    assert_eq!(format_best(Some(8_000)), "00:00:08");
}
