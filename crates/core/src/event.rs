// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw per-call access events, as produced by interceptors and consumed by
//! the event queue and collector.

use crate::mode::AccessMode;
use crate::time::FileTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One observation of a file-system access, produced by an interceptor
/// replacement body (spec.md §3 "RawEvent").
///
/// `path` is always absolute, canonicalized and symlink-resolved by the
/// time a `RawEvent` is constructed — path resolution happens at the
/// interceptor, not here (spec.md §4.D). A `RawEvent` with an empty path
/// should never be constructed; interceptors drop the access instead of
/// producing one (spec.md §7 "Path resolution failure").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub path: PathBuf,
    pub mode: AccessMode,
    pub time: FileTime,
    pub success: bool,
}

impl RawEvent {
    pub fn new(path: PathBuf, mode: AccessMode, time: FileTime, success: bool) -> Self {
        debug_assert!(!path.as_os_str().is_empty(), "RawEvent path must not be empty");
        debug_assert!(
            mode == AccessMode::READ || mode == AccessMode::WRITE || mode == AccessMode::DELETE,
            "RawEvent carries exactly one mode flag; compound flags are multiple events"
        );
        Self { path, mode, time, success }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
