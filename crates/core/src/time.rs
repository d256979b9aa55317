// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-time representation and the clock abstraction used throughout the
//! monitor.
//!
//! Every timestamp the monitor records is either an OS-reported file
//! last-write time or, when no such time exists (a destroyed or
//! never-materialized file), the wall-clock time of the intercepted call
//! (spec.md §4.D "Time source"). Both are represented by the same
//! [`FileTime`] so that `AccessRecord::last_write_time` never needs to care
//! which source produced a given value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in time at the resolution the OS actually provides (typically
/// milliseconds). Implementations must not attempt finer granularity than
/// what the OS reports (spec.md §4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileTime(chrono::DateTime<chrono::Utc>);

impl FileTime {
    pub fn from_utc(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    pub fn epoch_ms(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn from_epoch_ms(ms: i64) -> Self {
        Self(chrono::DateTime::from_timestamp_millis(ms).unwrap_or_default())
    }

    /// Build a `FileTime` from a raw Win32 `FILETIME` value: 100-nanosecond
    /// intervals since 1601-01-01 (spec.md §6, the wire format's ten-digit
    /// fractional-second field is this unit, not nanoseconds). Used by
    /// `amon-interceptors::winapi_patch::WindowsOs`, the only caller that
    /// ever sees a raw `FILETIME`.
    pub fn from_windows_ticks(ticks: u64) -> Self {
        const WINDOWS_TO_UNIX_EPOCH_100NS: i64 = 116_444_736_000_000_000;
        let unix_100ns = ticks as i64 - WINDOWS_TO_UNIX_EPOCH_100NS;
        let secs = unix_100ns.div_euclid(10_000_000);
        let subsec_100ns = unix_100ns.rem_euclid(10_000_000);
        let nanos = (subsec_100ns * 100) as u32;
        Self(chrono::DateTime::from_timestamp(secs, nanos).unwrap_or_default())
    }

    pub fn as_chrono(&self) -> chrono::DateTime<chrono::Utc> {
        self.0
    }
}

impl Default for FileTime {
    fn default() -> Self {
        Self(chrono::DateTime::UNIX_EPOCH)
    }
}

/// Renders as the event-file wire format's timestamp field:
/// `YYYY-MM-DD HH:MM:SS.ffffffffff` (spec.md §6). The OS typically only
/// supplies millisecond resolution; the remaining digits are zero-padded.
impl fmt::Display for FileTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // chrono's finest native resolution is nanoseconds (9 digits); the
        // wire format's ten `f` digits are a Windows FILETIME artifact
        // (100ns ticks), so the trailing digit is always zero here.
        let nanos_x10 = self.0.timestamp_subsec_nanos() as u64 * 10;
        write!(f, "{}.{:010}", self.0.format("%Y-%m-%d %H:%M:%S"), nanos_x10)
    }
}

/// A clock that provides both OS file-times and the call's own wall-clock
/// time, exactly the two time sources spec.md §4.D distinguishes.
///
/// A `Clock` trait/`SystemClock`/`FakeClock` substitution seam,
/// generalized from "now" to the two distinct notions of time
/// this subsystem needs. Interceptors call `wall_clock_time` for
/// operations that destroy or never materialize a file, and ask the `Os`
/// seam (in `amon-interceptors`) for the OS file time otherwise.
pub trait Clock: Clone + Send + Sync + 'static {
    fn wall_clock_time(&self) -> FileTime;
}

/// Real system clock.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn wall_clock_time(&self) -> FileTime {
        FileTime::from_utc(chrono::Utc::now())
    }
}

/// Deterministic clock for tests.
#[derive(Clone)]
pub struct FakeClock {
    now: std::sync::Arc<parking_lot::Mutex<FileTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { now: std::sync::Arc::new(parking_lot::Mutex::new(FileTime::from_epoch_ms(0))) }
    }

    pub fn set(&self, t: FileTime) {
        *self.now.lock() = t;
    }

    pub fn advance_ms(&self, ms: i64) {
        let mut guard = self.now.lock();
        *guard = FileTime::from_epoch_ms(guard.epoch_ms() + ms);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn wall_clock_time(&self) -> FileTime {
        *self.now.lock()
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
