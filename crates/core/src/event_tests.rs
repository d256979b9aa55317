// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn constructs_a_single_flag_event() {
    let e = RawEvent::new(
        PathBuf::from("/w/a.txt"),
        AccessMode::WRITE,
        FileTime::from_epoch_ms(1_000),
        true,
    );
    assert_eq!(e.mode, AccessMode::WRITE);
    assert!(e.success);
}

#[test]
#[should_panic(expected = "carries exactly one mode flag")]
fn rejects_compound_mode_in_debug() {
    let _ = RawEvent::new(
        PathBuf::from("/w/a.txt"),
        AccessMode::READ.union(AccessMode::WRITE),
        FileTime::from_epoch_ms(0),
        true,
    );
}
