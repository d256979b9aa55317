// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-API interceptor replacement bodies (spec.md §4.D).
//!
//! Each method here models one category from spec.md §4.D's table: it has
//! already been called *after* the trampoline invoked the real OS
//! function, and is handed the raw path(s) as the OS call saw them, the
//! call's outcome, and (where relevant) the requested access flags. Each
//! method resolves the path(s) through the [`Os`] seam, and emits one
//! `RawEvent` per single mode bit into the calling thread's current
//! session — or emits nothing at all, if the thread isn't inside a
//! session, is already inside another interceptor (reentrancy, spec.md
//! §4.B), or the path fails to resolve (spec.md §4.D "Path resolution
//! failure").
//!
//! [`with_guard`](FileInterceptors::with_guard) opens the reentrancy
//! window (and the error-state save it carries) before any of this
//! crate's own OS calls run, including the write-time/access-mask lookups
//! a handler needs to decide what to emit — not just the final path
//! resolution and push (spec.md §5, §4.C: the window has to cover every
//! OS call this monitor makes on the calling thread's behalf, since any
//! one of them could otherwise clobber the caller's own pending error
//! code or recursively re-enter a patched function).

use crate::access_flags::{project_open_mode, DesiredAccess};
use crate::os::{HandleId, Os};
use amon_core::{AccessMode, LogAspects, RawEvent, SessionId};
use amon_engine::{current_session, DebugLogRouter, EventRouter, ReentrancyGuard};

pub struct FileInterceptors<'a> {
    os: &'a dyn Os,
}

impl<'a> FileInterceptors<'a> {
    pub fn new(os: &'a dyn Os) -> Self {
        Self { os }
    }

    /// Directory create (spec.md §4.D table row 1).
    pub fn on_create_directory(&self, path_hint: &str, success: bool) {
        self.with_guard(|session| {
            let time = self.os.wall_clock_time();
            self.push(session, path_hint, AccessMode::WRITE, time, success);
        });
    }

    /// Directory remove (row 2).
    pub fn on_remove_directory(&self, path_hint: &str, success: bool) {
        self.with_guard(|session| {
            let time = self.os.wall_clock_time();
            self.push(session, path_hint, AccessMode::DELETE, time, success);
        });
    }

    /// File open/create (row 3). `flags` projects to a possibly-compound
    /// mode (e.g. an all-access open is both `Read` and `Write`); `push`
    /// splits it into one event per bit.
    pub fn on_open_or_create_file(&self, path_hint: &str, flags: DesiredAccess, success: bool) {
        let mode = project_open_mode(flags);
        self.with_guard(|session| {
            let time = self.materialized_time(session, path_hint, success);
            self.push(session, path_hint, mode, time, success);
        });
    }

    /// File delete (row 4).
    pub fn on_delete_file(&self, path_hint: &str, success: bool) {
        self.with_guard(|session| {
            let time = self.os.wall_clock_time();
            self.push(session, path_hint, AccessMode::DELETE, time, success);
        });
    }

    /// File copy (row 5): `(src, Read)` and `(dst, Write)`.
    ///
    /// The original source's copy interceptor has two variants, one of
    /// which additionally ORs `Delete` into the source event; spec.md §9
    /// treats that as a bug in the source and fixes the contract at `Read`
    /// only, which is what this implements.
    pub fn on_copy_file(&self, src_hint: &str, dst_hint: &str, success: bool) {
        self.with_guard(|session| self.copy_file_body(session, src_hint, dst_hint, success));
    }

    /// File move/rename (row 6): `(src, Delete)` and `(dst, Write)`.
    pub fn on_move_file(&self, src_hint: &str, dst_hint: &str, success: bool) {
        self.with_guard(|session| self.move_file_body(session, src_hint, dst_hint, success));
    }

    /// `ReplaceFileW`-shaped move, with an optional non-null backup-name
    /// argument additionally read (SPEC_FULL.md §4.D supplement, grounded
    /// in `MonitorFiles.cpp`'s handling of `ReplaceFileW`).
    pub fn on_replace_file(&self, replaced_hint: &str, replacement_hint: &str, backup_hint: Option<&str>, success: bool) {
        self.with_guard(|session| {
            self.move_file_body(session, replacement_hint, replaced_hint, success);
            if let Some(backup) = backup_hint {
                let time = self.os.wall_clock_time();
                self.push(session, backup, AccessMode::READ, time, success);
            }
        });
    }

    /// `CreateHardLinkW`: grouped with copy rather than move, since it
    /// materializes a second name for existing content without removing
    /// the first (SPEC_FULL.md §4.D supplement).
    pub fn on_create_hard_link(&self, existing_hint: &str, new_hint: &str, success: bool) {
        self.with_guard(|session| self.copy_file_body(session, existing_hint, new_hint, success));
    }

    /// Directory enumeration (row 7): `FindFirstFileW`/`FindNextFileW`.
    pub fn on_enumerate_directory(&self, path_hint: &str, success: bool) {
        self.with_guard(|session| {
            let time = self.os.wall_clock_time();
            self.push(session, path_hint, AccessMode::READ, time, success);
        });
    }

    /// Attribute query (row 8).
    pub fn on_query_attributes(&self, path_hint: &str, success: bool) {
        self.with_guard(|session| {
            let time = self.os.wall_clock_time();
            self.push(session, path_hint, AccessMode::READ, time, success);
        });
    }

    /// Attribute mutate (row 9).
    pub fn on_mutate_attributes(&self, path_hint: &str, success: bool) {
        self.with_guard(|session| {
            let time = self.os.wall_clock_time();
            self.push(session, path_hint, AccessMode::WRITE, time, success);
        });
    }

    /// Handle close (row 10). Only a handle opened with write or append
    /// access (or all-access, which subsumes it) emits a close-time event;
    /// a read-only handle's close is silent. The access mask is the
    /// *actual* mask the handle carries, looked up before close, not the
    /// mask requested at open (spec.md §4.D "Mode projection on close").
    pub fn on_close_handle(&self, handle: HandleId, path_at_open: &str, success: bool) {
        self.with_guard(|session| {
            let Some(mask) = self.os.handle_access_mask(handle) else { return };
            if !(mask.all_access || mask.write_or_append) {
                return;
            }
            let time = self.materialized_time(session, path_at_open, success);
            self.push(session, path_at_open, AccessMode::WRITE, time, success);
        });
    }

    fn copy_file_body(&self, session: SessionId, src_hint: &str, dst_hint: &str, success: bool) {
        let time = self.os.wall_clock_time();
        self.push(session, src_hint, AccessMode::READ, time, success);
        let dst_time = self.materialized_time(session, dst_hint, success);
        self.push(session, dst_hint, AccessMode::WRITE, dst_time, success);
    }

    fn move_file_body(&self, session: SessionId, src_hint: &str, dst_hint: &str, success: bool) {
        let time = self.os.wall_clock_time();
        self.push(session, src_hint, AccessMode::DELETE, time, success);
        let dst_time = self.materialized_time(session, dst_hint, success);
        self.push(session, dst_hint, AccessMode::WRITE, dst_time, success);
    }

    /// The write time to report for a successful, materialized access:
    /// the path's actual last-write-time if it resolves, falling back to
    /// wall-clock time otherwise. Failed calls always get wall-clock time,
    /// since there's nothing on disk to query. Must run inside the
    /// reentrancy window — it calls through `self.os`. Logged under the
    /// `WriteTime` debug aspect whenever it actually resolves a time.
    fn materialized_time(&self, session: SessionId, path_hint: &str, success: bool) -> amon_core::FileTime {
        if !success {
            return self.os.wall_clock_time();
        }
        let resolved = self.os.resolve_path(path_hint).and_then(|p| self.os.file_last_write_time(&p));
        if let Some(time) = resolved {
            DebugLogRouter::global().record(
                session,
                LogAspects::WRITE_TIME,
                "resolved last-write-time",
                &[("path_hint", path_hint.to_string()), ("time", time.to_string())],
            );
        }
        resolved.unwrap_or_else(|| self.os.wall_clock_time())
    }

    /// Opens the reentrancy window for one replacement body: bails out
    /// silently if the calling thread isn't inside a session, or is
    /// already inside another interceptor. Everything the body does
    /// through `self.os` — time lookups, access-mask lookups, path
    /// resolution — runs inside the window, so the caller's own pending
    /// OS error code is saved before any of it and restored once the body
    /// returns, regardless of how many OS calls the body itself made
    /// (spec.md §5, §4.C).
    fn with_guard(&self, body: impl FnOnce(SessionId)) {
        let Some(session) = current_session() else { return };
        let Some(_guard) = ReentrancyGuard::enter(|| self.os.save_error_state(), |state| self.os.restore_error_state(state))
        else {
            return;
        };
        body(session);
    }

    fn push(&self, session: SessionId, path_hint: &str, mode: AccessMode, time: amon_core::FileTime, success: bool) {
        let Some(path) = self.os.resolve_path(path_hint) else { return };
        for single in split_into_single_flag_events(mode) {
            DebugLogRouter::global().record(
                session,
                LogAspects::FILE_ACCESSES,
                "file access",
                &[("path", path.display().to_string()), ("mode", single.to_string()), ("success", success.to_string())],
            );
            EventRouter::global().push(session, RawEvent::new(path.clone(), single, time, success));
        }
    }
}

fn split_into_single_flag_events(mode: AccessMode) -> Vec<AccessMode> {
    let mut out = Vec::with_capacity(3);
    if mode.contains(AccessMode::READ) {
        out.push(AccessMode::READ);
    }
    if mode.contains(AccessMode::WRITE) {
        out.push(AccessMode::WRITE);
    }
    if mode.contains(AccessMode::DELETE) {
        out.push(AccessMode::DELETE);
    }
    out
}
