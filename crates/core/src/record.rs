// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-path access accumulator and its fold (spec.md §3, §4.A).

use crate::mode::AccessMode;
use crate::time::FileTime;
use serde::{Deserialize, Serialize};

/// One observed path's accumulated access record within a session.
///
/// Invariants (spec.md §3, tested in [`mod@crate::record::tests`]):
/// - `effective_mode ⊆ all_modes`
/// - `last_write_time` is monotone non-decreasing within a session for a
///   fixed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    pub effective_mode: AccessMode,
    pub all_modes: AccessMode,
    pub success_count: u64,
    pub failure_count: u64,
    pub last_write_time: Option<FileTime>,
}

impl AccessRecord {
    /// A record with no observations yet.
    pub fn empty() -> Self {
        Self {
            effective_mode: AccessMode::NONE,
            all_modes: AccessMode::NONE,
            success_count: 0,
            failure_count: 0,
            last_write_time: None,
        }
    }

    /// A record holding the first observation `(mode, time, success)`.
    pub fn new(mode: AccessMode, time: FileTime, success: bool) -> Self {
        let mut record = Self::empty();
        record.fold(mode, time, success);
        record
    }

    /// Fold one more observation into this record, per spec.md §4.A:
    ///
    /// - `mode == None`: a no-op (spec.md §8 invariant 7 — folding `None`
    ///   leaves the record exactly as it was, regardless of `success`).
    /// - success: dominate `effective_mode`, union `all_modes`, bump
    ///   `success_count`, and advance `last_write_time` when `mode != Read`
    ///   and `time` is newer than what's recorded.
    /// - failure: union `all_modes`, bump `failure_count`; `effective_mode`
    ///   and `last_write_time` are untouched.
    pub fn fold(&mut self, mode: AccessMode, time: FileTime, success: bool) {
        if mode.is_empty() {
            return;
        }
        self.all_modes = self.all_modes.union(mode);
        if success {
            self.effective_mode = self.effective_mode.dominate(mode);
            self.success_count += 1;
            if mode != AccessMode::READ {
                match self.last_write_time {
                    Some(existing) if existing >= time => {}
                    _ => self.last_write_time = Some(time),
                }
            }
        } else {
            self.failure_count += 1;
        }
    }

    /// Fold another record's observations into this one. Used by the
    /// collector when merging per-process event files; relies on `fold`
    /// being order-insensitive (spec.md §8 invariant 5), so folding a
    /// whole record in is equivalent to folding its constituent events in
    /// any order.
    pub fn merge(&mut self, other: &AccessRecord) {
        self.all_modes = self.all_modes.union(other.all_modes);
        self.effective_mode = self.effective_mode.dominate(other.effective_mode);
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
        self.last_write_time = match (self.last_write_time, other.last_write_time) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(a), None) => Some(a),
            (None, b) => b,
        };
    }

    pub fn total_events(&self) -> u64 {
        self.success_count + self.failure_count
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
