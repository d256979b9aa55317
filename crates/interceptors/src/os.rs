// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Os` seam (spec.md §7.1 supplement): exactly the primitive OS
//! queries an interceptor replacement body needs beyond the patched call
//! itself. Production code implements this over real Win32 calls
//! (`WindowsOs`, `cfg(windows)`, see `winapi_patch`); tests and
//! `amon-cli`'s dry-run mode use [`FakeOs`], a deterministic in-memory
//! implementation — the same substitution pattern `amon-core::Clock` uses
//! for `SystemClock`/`FakeClock`.

use crate::access_flags::DesiredAccess;
use amon_core::FileTime;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A stable handle identifier, opaque to everything above this crate. On
/// Windows this is the raw `HANDLE` value; `FakeOs` just uses small
/// integers.
pub type HandleId = u64;

pub trait Os: Send + Sync {
    /// Resolve a raw path as reported by the intercepted call to its
    /// absolute, canonicalized, symlink-resolved form (spec.md §4.D "Path
    /// resolution"). Returns `None` when resolution fails — the caller
    /// drops the event rather than failing the call (spec.md §7).
    fn resolve_path(&self, raw: &str) -> Option<PathBuf>;

    /// The OS-reported last-write time of a path that still exists on
    /// disk, or `None` if the OS has nothing to report (e.g. the path was
    /// just deleted). Used for operations that leave a file on disk
    /// (spec.md §4.D "Time source").
    fn file_last_write_time(&self, path: &Path) -> Option<FileTime>;

    /// The call's own wall-clock time, used for operations that destroy or
    /// never materialize a file (spec.md §4.D "Time source").
    fn wall_clock_time(&self) -> FileTime;

    /// The *actual* access mask a handle was opened with, looked up at
    /// close time rather than re-derived from the open call's requested
    /// flags (spec.md §4.D "Handle close" / "Mode projection on close").
    fn handle_access_mask(&self, handle: HandleId) -> Option<DesiredAccess>;

    /// Read the calling thread's per-thread OS error-code register
    /// (`GetLastError` on Windows), for the reentrancy guard to restore
    /// after the monitor's own OS calls (spec.md §5 "Error-code
    /// transparency"). `FakeOs` has no such register and returns `0`.
    fn save_error_state(&self) -> u32 {
        0
    }

    /// Restore a previously saved error-code register value.
    fn restore_error_state(&self, _state: u32) {}
}

/// Deterministic in-memory `Os` for tests and dry runs.
#[derive(Default)]
pub struct FakeOs {
    clock: amon_core::FakeClock,
    last_write_times: Mutex<HashMap<PathBuf, FileTime>>,
    handles: Mutex<HashMap<HandleId, DesiredAccess>>,
    unresolvable: Mutex<Vec<String>>,
}

impl FakeOs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> &amon_core::FakeClock {
        &self.clock
    }

    /// Record that a path now has the given OS-reported last-write time,
    /// as if a write had just landed on disk.
    pub fn set_last_write_time(&self, path: impl Into<PathBuf>, time: FileTime) {
        self.last_write_times.lock().insert(path.into(), time);
    }

    pub fn clear_last_write_time(&self, path: &Path) {
        self.last_write_times.lock().remove(path);
    }

    /// Register the access mask a (fake) handle was opened with, so a
    /// later `handle_access_mask` lookup at close time reflects it.
    pub fn register_handle(&self, handle: HandleId, mask: DesiredAccess) {
        self.handles.lock().insert(handle, mask);
    }

    pub fn close_handle(&self, handle: HandleId) {
        self.handles.lock().remove(&handle);
    }

    /// Make a specific raw path hint fail to resolve, simulating an empty
    /// or out-of-namespace path (spec.md §4.D).
    pub fn mark_unresolvable(&self, raw: impl Into<String>) {
        self.unresolvable.lock().push(raw.into());
    }
}

impl Os for FakeOs {
    fn resolve_path(&self, raw: &str) -> Option<PathBuf> {
        if raw.is_empty() || self.unresolvable.lock().iter().any(|u| u == raw) {
            return None;
        }
        Some(PathBuf::from(raw))
    }

    fn file_last_write_time(&self, path: &Path) -> Option<FileTime> {
        self.last_write_times.lock().get(path).copied()
    }

    fn wall_clock_time(&self) -> FileTime {
        self.clock.wall_clock_time()
    }

    fn handle_access_mask(&self, handle: HandleId) -> Option<DesiredAccess> {
        self.handles.lock().get(&handle).copied()
    }
}
