// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Workspace-wide end-to-end scenarios (spec.md §8, SPEC_FULL.md §6.4):
//! `start_session` → synthetic file ops through the real interceptor
//! bodies over `FakeOs` → `stop_session`, covering S1–S6 plus the two
//! supplementary scenarios S7 (concurrent sessions share one interceptor
//! installation) and S8 (`stop_session` blocks on a still-live
//! participant).
//!
//! One root-level crate exercising the public surface end to end, rather
//! than any one module's internals.

use amon_core::{AccessMode, LogAspects, SessionId};
use amon_engine::{InterceptorRegistry, SessionRegistry, Symbol};
use amon_interceptors::{os::FakeOs, DesiredAccess, FakePatchOps, FileInterceptors};
use amon_runtime::{start_session, stop_session, NoParticipantsWaiter, ParticipantWaiter, SessionRequest, StartOptions};
use serial_test::serial;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

fn symbols() -> Vec<Symbol> {
    amon_interceptors::intercepted_symbols()
}

fn start(directory: &std::path::Path) -> (SessionId, FakeOs, FakePatchOps) {
    let os = FakeOs::new();
    let ops = FakePatchOps::new();
    let id = start_session(
        StartOptions { directory: Some(directory.to_path_buf()), log_aspects: Some(LogAspects::NONE) },
        SessionRequest::New,
        &symbols(),
        &ops,
    )
    .unwrap();
    (id, os, ops)
}

#[test]
#[serial]
fn s1_write_read_delete() {
    let dir = tempfile::tempdir().unwrap();
    let (id, os, ops) = start(dir.path());
    os.set_last_write_time("/w/a.txt", amon_core::FileTime::from_epoch_ms(100));

    let interceptors = FileInterceptors::new(&os);
    interceptors.on_open_or_create_file("/w/a.txt", DesiredAccess::WRITE_OR_APPEND, true);
    interceptors.on_open_or_create_file("/w/a.txt", DesiredAccess::READ_ANY, true);
    interceptors.on_delete_file("/w/a.txt", true);

    let map = stop_session(id, &NoParticipantsWaiter, &ops).unwrap();
    let record = map.get(&PathBuf::from("/w/a.txt")).unwrap();
    assert_eq!(record.effective_mode, AccessMode::DELETE);
    assert_eq!(record.all_modes, AccessMode::READ.union(AccessMode::WRITE).union(AccessMode::DELETE));
    assert_eq!(record.success_count, 3);
    assert_eq!(record.last_write_time, Some(amon_core::FileTime::from_epoch_ms(100)));
}

#[test]
#[serial]
fn s2_copy() {
    let dir = tempfile::tempdir().unwrap();
    let (id, os, ops) = start(dir.path());
    os.set_last_write_time("/dst/x", amon_core::FileTime::from_epoch_ms(50));

    FileInterceptors::new(&os).on_copy_file("/src/x", "/dst/x", true);

    let map = stop_session(id, &NoParticipantsWaiter, &ops).unwrap();
    assert_eq!(map.get(&PathBuf::from("/src/x")).unwrap().effective_mode, AccessMode::READ);
    assert_eq!(map.get(&PathBuf::from("/dst/x")).unwrap().effective_mode, AccessMode::WRITE);
}

#[test]
#[serial]
fn s3_move() {
    let dir = tempfile::tempdir().unwrap();
    let (id, os, ops) = start(dir.path());
    os.set_last_write_time("/dst/y", amon_core::FileTime::from_epoch_ms(20));

    FileInterceptors::new(&os).on_move_file("/src/y", "/dst/y", true);

    let map = stop_session(id, &NoParticipantsWaiter, &ops).unwrap();
    assert_eq!(map.get(&PathBuf::from("/src/y")).unwrap().effective_mode, AccessMode::DELETE);
    assert_eq!(map.get(&PathBuf::from("/dst/y")).unwrap().effective_mode, AccessMode::WRITE);
}

#[test]
#[serial]
fn s5_failed_open_then_successful_open() {
    let dir = tempfile::tempdir().unwrap();
    let (id, os, ops) = start(dir.path());
    os.set_last_write_time("/r/missing", amon_core::FileTime::from_epoch_ms(7));

    let interceptors = FileInterceptors::new(&os);
    interceptors.on_open_or_create_file("/r/missing", DesiredAccess::READ_ANY, false);
    interceptors.on_open_or_create_file("/r/missing", DesiredAccess::WRITE_OR_APPEND, true);
    interceptors.on_open_or_create_file("/r/missing", DesiredAccess::READ_ANY, true);

    let map = stop_session(id, &NoParticipantsWaiter, &ops).unwrap();
    let record = map.get(&PathBuf::from("/r/missing")).unwrap();
    assert_eq!(record.effective_mode, AccessMode::WRITE);
    assert_eq!(record.all_modes, AccessMode::READ.union(AccessMode::WRITE));
    assert_eq!(record.success_count, 2);
    assert_eq!(record.failure_count, 1);
}

#[test]
#[serial]
fn s6_close_of_all_access_handle_yields_write() {
    let dir = tempfile::tempdir().unwrap();
    let (id, os, ops) = start(dir.path());
    os.register_handle(9, DesiredAccess::ALL_ACCESS);
    os.set_last_write_time("/d/f", amon_core::FileTime::from_epoch_ms(5));

    let interceptors = FileInterceptors::new(&os);
    interceptors.on_open_or_create_file("/d/f", DesiredAccess::ALL_ACCESS, true);
    interceptors.on_close_handle(9, "/d/f", true);

    let map = stop_session(id, &NoParticipantsWaiter, &ops).unwrap();
    let record = map.get(&PathBuf::from("/d/f")).unwrap();
    assert!(record.all_modes.contains(AccessMode::WRITE));
}

#[test]
#[serial]
fn s7_concurrent_sessions_in_one_process_share_one_installation() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let ops = FakePatchOps::new();
    let syms = symbols();

    let id_a = start_session(
        StartOptions { directory: Some(dir_a.path().to_path_buf()), log_aspects: None },
        SessionRequest::New,
        &syms,
        &ops,
    )
    .unwrap();
    assert_eq!(InterceptorRegistry::global().refcount(), 1);

    let id_b = start_session(
        StartOptions { directory: Some(dir_b.path().to_path_buf()), log_aspects: None },
        SessionRequest::New,
        &syms,
        &ops,
    )
    .unwrap();
    assert_eq!(InterceptorRegistry::global().refcount(), 2);

    stop_session(id_a, &NoParticipantsWaiter, &ops).unwrap();
    assert!(InterceptorRegistry::global().is_installed(), "second session still holds the installation");

    stop_session(id_b, &NoParticipantsWaiter, &ops).unwrap();
    assert!(!InterceptorRegistry::global().is_installed());
}

/// Records the pid it was asked to wait on before resolving, so the test
/// can assert `stop_session` actually consulted the waiter for every
/// remaining participant instead of skipping straight to the fold.
#[derive(Default)]
struct RecordingWaiter {
    waited_on: Mutex<Vec<u32>>,
    calls: AtomicU32,
}

impl ParticipantWaiter for RecordingWaiter {
    fn wait_for_exit(&self, pid: u32) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.waited_on.lock().unwrap().push(pid);
    }
}

#[test]
#[serial]
fn s8_stop_session_waits_for_every_live_participant() {
    let dir = tempfile::tempdir().unwrap();
    let (id, _os, ops) = start(dir.path());

    SessionRegistry::global().add_participant(id, 4242).unwrap();

    let waiter = RecordingWaiter::default();
    stop_session(id, &waiter, &ops).unwrap();

    assert!(waiter.waited_on.lock().unwrap().contains(&4242));
    assert!(waiter.calls.load(Ordering::SeqCst) >= 1);
}

#[test]
#[serial]
fn stopping_twice_is_an_error_the_second_time() {
    let dir = tempfile::tempdir().unwrap();
    let (id, _os, ops) = start(dir.path());
    stop_session(id, &NoParticipantsWaiter, &ops).unwrap();
    assert!(stop_session(id, &NoParticipantsWaiter, &ops).is_err());
}
