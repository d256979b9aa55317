// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    none = { AccessMode::NONE, "None" },
    read = { AccessMode::READ, "Read" },
    write = { AccessMode::WRITE, "Write" },
    delete = { AccessMode::DELETE, "Delete" },
    read_write = { AccessMode::READ.union(AccessMode::WRITE), "ReadWrite" },
    read_delete = { AccessMode::READ.union(AccessMode::DELETE), "ReadDelete" },
    write_delete = { AccessMode::WRITE.union(AccessMode::DELETE), "WriteDelete" },
    all = { AccessMode::READ.union(AccessMode::WRITE).union(AccessMode::DELETE), "ReadWriteDelete" },
)]
fn renders_canonical_token_order(mode: AccessMode, expected: &str) {
    assert_eq!(mode.to_token_string(), expected);
}

#[test]
fn round_trips_every_lattice_element() {
    let all_subsets = (0u8..8).map(AccessMode);
    for mode in all_subsets {
        let rendered = mode.to_token_string();
        assert_eq!(AccessMode::from_token_string(&rendered), mode);
    }
}

#[test]
fn parsing_tolerates_unknown_trailing_token() {
    // "ReadWriteFrobnicate" — stops after recognizing Read, Write.
    let parsed = AccessMode::from_token_string("ReadWriteFrobnicate");
    assert_eq!(parsed, AccessMode::READ.union(AccessMode::WRITE));
}

#[parameterized(
    delete_wins_write = { AccessMode::DELETE, AccessMode::WRITE, AccessMode::DELETE },
    delete_wins_read = { AccessMode::DELETE, AccessMode::READ, AccessMode::DELETE },
    write_wins_read = { AccessMode::WRITE, AccessMode::READ, AccessMode::WRITE },
    read_wins_none = { AccessMode::READ, AccessMode::NONE, AccessMode::READ },
    none_with_none = { AccessMode::NONE, AccessMode::NONE, AccessMode::NONE },
)]
fn dominate_follows_lattice_order(a: AccessMode, b: AccessMode, expected: AccessMode) {
    assert_eq!(a.dominate(b), expected);
    assert_eq!(b.dominate(a), expected, "dominate must be symmetric");
}

proptest::proptest! {
    #[test]
    fn dominate_is_idempotent(bits in 0u8..8) {
        let m = AccessMode(bits);
        assert_eq!(m.dominate(m), m.dominate(AccessMode::NONE).dominate(m));
    }
}
