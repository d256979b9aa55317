// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_starts_at_epoch() {
    let clock = FakeClock::new();
    assert_eq!(clock.wall_clock_time().epoch_ms(), 0);
}

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new();
    clock.advance_ms(1_500);
    assert_eq!(clock.wall_clock_time().epoch_ms(), 1_500);
}

#[test]
fn display_matches_event_file_timestamp_shape() {
    let t = FileTime::from_epoch_ms(0);
    let rendered = t.to_string();
    // "YYYY-MM-DD HH:MM:SS.ffffffffff"
    assert_eq!(rendered.len(), "1970-01-01 00:00:00.0000000000".len());
    assert!(rendered.starts_with("1970-01-01 00:00:00"));
}

#[test]
fn ordering_is_monotone_with_epoch_ms() {
    let a = FileTime::from_epoch_ms(100);
    let b = FileTime::from_epoch_ms(200);
    assert!(a < b);
}
