// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Waiting for participant processes to exit (spec.md §5 "`stop_session`
//! waits for all participant processes to exit before folding event
//! files"). Kept behind a seam, the same pattern as `amon_interceptors::Os`
//! and `amon_inject::RemoteProcessOps`: production code polls the real OS
//! for process liveness; tests substitute a fake that resolves
//! immediately or on demand.

use std::time::Duration;

pub trait ParticipantWaiter: Send + Sync {
    /// Block until `pid` is no longer a live process. Must return
    /// immediately if the process has already exited.
    fn wait_for_exit(&self, pid: u32);
}

/// Polls process liveness at a fixed interval. A session's participants
/// are not always direct children of the root process (a grandchild
/// spawned by an already-monitored child is still a participant), so this
/// cannot use a reap-based `waitpid`/`WaitForSingleObject` on an owned
/// child handle; polling existence is the only mechanism that works
/// uniformly across the whole descendant tree.
pub struct PollingWaiter {
    poll_interval: Duration,
}

impl PollingWaiter {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Default for PollingWaiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(20))
    }
}

impl ParticipantWaiter for PollingWaiter {
    fn wait_for_exit(&self, pid: u32) {
        while process_is_alive(pid) {
            std::thread::sleep(self.poll_interval);
        }
    }
}

#[cfg(unix)]
fn process_is_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    // A `None` signal is the POSIX "existence probe" (`kill(pid, 0)`): no
    // signal is delivered, the call only reports whether the pid exists
    // and is signalable.
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(windows)]
fn process_is_alive(pid: u32) -> bool {
    amon_inject::process_is_alive(pid)
}

/// Test/dry-run double: every pid is already considered exited. Used by
/// single-process sessions (spec.md §8 scenario 10's parent-only half) and
/// the unit tests in this crate, where no participant process is ever
/// actually spawned.
#[derive(Default)]
pub struct NoParticipantsWaiter;

impl ParticipantWaiter for NoParticipantsWaiter {
    fn wait_for_exit(&self, _pid: u32) {}
}
