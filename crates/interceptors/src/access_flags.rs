// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mode projection for file open/create and handle close (spec.md §4.D
//! "File open/create" row, "Mode projection on close").

use amon_core::AccessMode;

/// The OS access flags an open/create call requested, or a handle carries,
/// abstracted away from any particular platform's bit layout. `WindowsOs`
/// derives this from `dwDesiredAccess`/`dwCreationDisposition`;
/// `FakeOs`/tests construct it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DesiredAccess {
    pub all_access: bool,
    pub read_any: bool,
    pub write_or_append: bool,
    pub delete: bool,
}

impl DesiredAccess {
    pub const NONE: DesiredAccess = DesiredAccess { all_access: false, read_any: false, write_or_append: false, delete: false };
    pub const READ_ANY: DesiredAccess = DesiredAccess { read_any: true, ..Self::NONE };
    pub const WRITE_OR_APPEND: DesiredAccess = DesiredAccess { write_or_append: true, ..Self::NONE };
    pub const DELETE_FLAG: DesiredAccess = DesiredAccess { delete: true, ..Self::NONE };
    pub const ALL_ACCESS: DesiredAccess = DesiredAccess { all_access: true, ..Self::NONE };
}

/// Map requested OS access flags to the set of `AccessMode` bits the open
/// (or close) should be attributed with (spec.md §4.D):
///
/// - all-access ⇒ `Read ∪ Write`
/// - read-any ⇒ `Read`
/// - write-any or append ⇒ `Write`
/// - delete-flag ⇒ `Delete`
///
/// The result may be a compound set (e.g. an all-access open yields both
/// `Read` and `Write`); `amon-core::RawEvent` requires a single flag per
/// event, so callers must split a compound mode into one event per bit
/// (see [`crate::file::split_into_single_flag_events`]).
pub fn project_open_mode(flags: DesiredAccess) -> AccessMode {
    let mut mode = AccessMode::NONE;
    if flags.all_access {
        mode = mode.union(AccessMode::READ).union(AccessMode::WRITE);
    }
    if flags.read_any {
        mode = mode.union(AccessMode::READ);
    }
    if flags.write_or_append {
        mode = mode.union(AccessMode::WRITE);
    }
    if flags.delete {
        mode = mode.union(AccessMode::DELETE);
    }
    mode
}
