// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The remote-process seam (spec.md §7.1-style supplement, same pattern as
//! `amon-interceptors::os::Os` and `amon-engine::registry::PatchOps`): the
//! raw OS primitives [`ProcessInjector`](crate::injector::ProcessInjector)
//! composes into the five-step contract of spec.md §4.F, kept behind a
//! trait so the contract itself — open, allocate, write, remote-thread,
//! wait — can be unit-tested without a live Windows target.

use amon_core::SessionId;
use std::time::Duration;

/// Opaque handle to an opened target process.
pub type RemoteProcessHandle = usize;
/// Opaque remote address returned by allocation.
pub type RemoteAddress = usize;
/// Opaque handle to the remote thread created to load the library.
pub type RemoteThreadHandle = usize;

pub trait RemoteProcessOps: Send + Sync {
    /// Open `pid` with the minimum rights needed to allocate memory, write
    /// memory and create a remote thread (spec.md §4.F "Mechanism").
    fn open_process(&self, pid: u32) -> Result<RemoteProcessHandle, String>;

    /// Allocate a small read-write region in the target large enough to
    /// hold `library_path_len` bytes (including a terminator).
    fn allocate(&self, process: RemoteProcessHandle, library_path_len: usize) -> Result<RemoteAddress, String>;

    /// Write the monitor library path into the previously allocated region.
    fn write_library_path(&self, process: RemoteProcessHandle, address: RemoteAddress, library_path: &str) -> Result<(), String>;

    /// Create a suspended remote thread whose entry point is the OS
    /// loader's "load library by path" function, with `address` as its
    /// argument.
    fn create_remote_thread(&self, process: RemoteProcessHandle, library_path_address: RemoteAddress) -> Result<RemoteThreadHandle, String>;

    fn resume_thread(&self, thread: RemoteThreadHandle) -> Result<(), String>;

    /// Block until the child signals `monitoring_active` for `session`, or
    /// `timeout` elapses (spec.md §5 "Injector waits ... with a finite,
    /// configurable timeout").
    fn wait_for_monitoring_active(&self, pid: u32, session: SessionId, timeout: Duration) -> Result<(), String>;

    fn close_thread_handle(&self, thread: RemoteThreadHandle);
    fn close_process_handle(&self, process: RemoteProcessHandle);
}

/// Deterministic in-memory [`RemoteProcessOps`] for tests: every step
/// succeeds unless explicitly configured to fail, and every call is
/// recorded for assertions.
#[cfg(any(test, feature = "fake"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        OpenProcess(u32),
        Allocate(RemoteProcessHandle, usize),
        WriteLibraryPath(RemoteProcessHandle, RemoteAddress, String),
        CreateRemoteThread(RemoteProcessHandle, RemoteAddress),
        ResumeThread(RemoteThreadHandle),
        WaitForMonitoringActive(u32, SessionId),
        CloseThreadHandle(RemoteThreadHandle),
        CloseProcessHandle(RemoteProcessHandle),
    }

    #[derive(Default)]
    pub struct FakeRemoteProcessOps {
        pub fail_open_process: Mutex<bool>,
        pub fail_allocate: Mutex<bool>,
        pub fail_write: Mutex<bool>,
        pub fail_remote_thread: Mutex<bool>,
        pub fail_resume: Mutex<bool>,
        pub fail_handshake: Mutex<bool>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl FakeRemoteProcessOps {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }
    }

    impl RemoteProcessOps for FakeRemoteProcessOps {
        fn open_process(&self, pid: u32) -> Result<RemoteProcessHandle, String> {
            self.calls.lock().push(Call::OpenProcess(pid));
            if *self.fail_open_process.lock() {
                return Err("OpenProcess denied".to_string());
            }
            Ok(pid as usize)
        }

        fn allocate(&self, process: RemoteProcessHandle, library_path_len: usize) -> Result<RemoteAddress, String> {
            self.calls.lock().push(Call::Allocate(process, library_path_len));
            if *self.fail_allocate.lock() {
                return Err("VirtualAllocEx failed".to_string());
            }
            Ok(0x1000)
        }

        fn write_library_path(&self, process: RemoteProcessHandle, address: RemoteAddress, library_path: &str) -> Result<(), String> {
            self.calls.lock().push(Call::WriteLibraryPath(process, address, library_path.to_string()));
            if *self.fail_write.lock() {
                return Err("WriteProcessMemory failed".to_string());
            }
            Ok(())
        }

        fn create_remote_thread(&self, process: RemoteProcessHandle, library_path_address: RemoteAddress) -> Result<RemoteThreadHandle, String> {
            self.calls.lock().push(Call::CreateRemoteThread(process, library_path_address));
            if *self.fail_remote_thread.lock() {
                return Err("CreateRemoteThread failed".to_string());
            }
            Ok(process + 1)
        }

        fn resume_thread(&self, thread: RemoteThreadHandle) -> Result<(), String> {
            self.calls.lock().push(Call::ResumeThread(thread));
            if *self.fail_resume.lock() {
                return Err("ResumeThread failed".to_string());
            }
            Ok(())
        }

        fn wait_for_monitoring_active(&self, pid: u32, session: SessionId, _timeout: Duration) -> Result<(), String> {
            self.calls.lock().push(Call::WaitForMonitoringActive(pid, session));
            if *self.fail_handshake.lock() {
                return Err("timed out".to_string());
            }
            Ok(())
        }

        fn close_thread_handle(&self, thread: RemoteThreadHandle) {
            self.calls.lock().push(Call::CloseThreadHandle(thread));
        }

        fn close_process_handle(&self, process: RemoteProcessHandle) {
            self.calls.lock().push(Call::CloseProcessHandle(process));
        }
    }
}
