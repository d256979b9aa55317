// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The injector contract (spec.md §4.F), modeled line-for-line on
//! `original_source/accessMonitor/Inject.cpp`'s `inject()`: open the
//! target with minimal rights, allocate a small region, write the monitor
//! library path into it, spawn a suspended remote thread whose entry point
//! is the loader's "load library by path" function, resume it, then block
//! on the parent-visible `monitoring_active` handshake event. Every step
//! is delegated through [`RemoteProcessOps`] so the contract itself is
//! testable without a live target process.

use crate::error::InjectError;
use crate::ops::RemoteProcessOps;
use amon_core::SessionId;
use std::time::Duration;

/// Drives one injection per `inject` call. Stateless beyond the library
/// path and timeout it was configured with — every call targets a fresh
/// process and starts the five-step contract from scratch.
pub struct ProcessInjector<'a> {
    ops: &'a dyn RemoteProcessOps,
    monitor_library_path: String,
    handshake_timeout: Duration,
}

impl<'a> ProcessInjector<'a> {
    pub fn new(ops: &'a dyn RemoteProcessOps, monitor_library_path: impl Into<String>, handshake_timeout: Duration) -> Self {
        Self { ops, monitor_library_path: monitor_library_path.into(), handshake_timeout }
    }

    /// Inject the monitor library into `pid` and block until it joins
    /// `session`, or until one of spec.md §4.F/§7's failure modes occurs.
    /// On any failure, whatever handles were already opened are released
    /// before returning — there is no happy-path-only cleanup.
    pub fn inject(&self, pid: u32, session: SessionId) -> Result<(), InjectError> {
        let process = self.ops.open_process(pid).map_err(|_| InjectError::OpenProcessFailed { pid })?;

        let path_len = self.monitor_library_path.len() + 1;
        let address = match self.ops.allocate(process, path_len) {
            Ok(address) => address,
            Err(_) => {
                self.ops.close_process_handle(process);
                return Err(InjectError::AllocationFailed { pid });
            }
        };

        if self.ops.write_library_path(process, address, &self.monitor_library_path).is_err() {
            self.ops.close_process_handle(process);
            return Err(InjectError::WriteMemoryFailed { pid });
        }

        let thread = match self.ops.create_remote_thread(process, address) {
            Ok(thread) => thread,
            Err(_) => {
                self.ops.close_process_handle(process);
                return Err(InjectError::RemoteThreadFailed { pid });
            }
        };

        if self.ops.resume_thread(thread).is_err() {
            self.ops.close_thread_handle(thread);
            self.ops.close_process_handle(process);
            return Err(InjectError::RemoteThreadFailed { pid });
        }

        let handshake = self.ops.wait_for_monitoring_active(pid, session, self.handshake_timeout);

        self.ops.close_thread_handle(thread);
        self.ops.close_process_handle(process);

        handshake.map_err(|_| InjectError::HandshakeTimedOut { pid, timeout_ms: self.handshake_timeout.as_millis() as u64 })
    }
}

impl amon_interceptors::Injector for ProcessInjector<'_> {
    fn inject(&self, child_pid: u32, session: SessionId) -> Result<(), String> {
        ProcessInjector::inject(self, child_pid, session).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::fake::{Call, FakeRemoteProcessOps};

    #[test]
    fn successful_injection_runs_every_step_in_order_and_releases_handles() {
        let ops = FakeRemoteProcessOps::new();
        let injector = ProcessInjector::new(&ops, "/opt/amon/libamon.so", Duration::from_millis(100));
        let session = SessionId::new(1);

        injector.inject(4242, session).unwrap();

        let calls = ops.calls();
        assert_eq!(
            calls,
            vec![
                Call::OpenProcess(4242),
                Call::Allocate(4242, "/opt/amon/libamon.so".len() + 1),
                Call::WriteLibraryPath(4242, 0x1000, "/opt/amon/libamon.so".to_string()),
                Call::CreateRemoteThread(4242, 0x1000),
                Call::ResumeThread(4243),
                Call::WaitForMonitoringActive(4242, session),
                Call::CloseThreadHandle(4243),
                Call::CloseProcessHandle(4242),
            ]
        );
    }

    #[test]
    fn failing_to_open_the_process_stops_before_any_allocation() {
        let ops = FakeRemoteProcessOps::new();
        *ops.fail_open_process.lock() = true;
        let injector = ProcessInjector::new(&ops, "/opt/amon/libamon.so", Duration::from_millis(100));

        let result = injector.inject(1, SessionId::new(0));

        assert!(matches!(result, Err(InjectError::OpenProcessFailed { pid: 1 })));
        assert_eq!(ops.calls(), vec![Call::OpenProcess(1)]);
    }

    #[test]
    fn allocation_failure_releases_the_process_handle() {
        let ops = FakeRemoteProcessOps::new();
        *ops.fail_allocate.lock() = true;
        let injector = ProcessInjector::new(&ops, "/opt/amon/libamon.so", Duration::from_millis(100));

        let result = injector.inject(9, SessionId::new(0));

        assert!(matches!(result, Err(InjectError::AllocationFailed { pid: 9 })));
        assert!(ops.calls().contains(&Call::CloseProcessHandle(9)));
    }

    #[test]
    fn handshake_timeout_still_releases_both_handles() {
        let ops = FakeRemoteProcessOps::new();
        *ops.fail_handshake.lock() = true;
        let injector = ProcessInjector::new(&ops, "/opt/amon/libamon.so", Duration::from_millis(50));
        let session = SessionId::new(3);

        let result = injector.inject(55, session);

        assert!(matches!(result, Err(InjectError::HandshakeTimedOut { pid: 55, timeout_ms: 50 })));
        assert!(ops.calls().contains(&Call::CloseThreadHandle(56)));
        assert!(ops.calls().contains(&Call::CloseProcessHandle(55)));
    }

    #[test]
    fn remote_thread_failure_does_not_attempt_resume_or_handshake() {
        let ops = FakeRemoteProcessOps::new();
        *ops.fail_remote_thread.lock() = true;
        let injector = ProcessInjector::new(&ops, "/opt/amon/libamon.so", Duration::from_millis(50));

        let result = injector.inject(7, SessionId::new(0));

        assert!(matches!(result, Err(InjectError::RemoteThreadFailed { pid: 7 })));
        assert!(!ops.calls().iter().any(|c| matches!(c, Call::ResumeThread(_) | Call::WaitForMonitoringActive(..))));
    }
}
