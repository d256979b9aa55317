// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread/process-API interceptor replacement bodies (spec.md §4.E).
//!
//! Thread and process creation both go through the same *forced-suspend*
//! pattern: the replacement body forces the `suspended` creation flag on
//! before calling through to the real OS function, does its own
//! registration bookkeeping while the new thread/process is guaranteed not
//! to be running user code yet, then resumes it — unless the caller's
//! original intent was itself suspended, in which case the forced flag is
//! left in place. [`SuspendedCreationGuard`] owns exactly that bit of state
//! so callers can't forget to restore it.

use crate::os::Os;
use amon_core::{LogAspects, SessionId};
use amon_engine::{current_session, set_current_session, DebugLogRouter, EventRouter, RegistryError, SessionRegistry};

/// Tracks whether a creation call's `suspended` flag was forced on for the
/// interceptor's own bookkeeping window, so the original caller-requested
/// intent (run immediately, or stay suspended) can be restored afterward
/// (SPEC_FULL.md §4.E supplement).
///
/// The original source's `PatchCreateThread` computes this as a single
/// local (`resume = !(flags & CREATE_SUSPENDED)`); giving it its own type
/// keeps the intent explicit at the call site and makes "did we already
/// resume this" a type-level question rather than a stray bool.
pub struct SuspendedCreationGuard {
    caller_wanted_running: bool,
    resumed: bool,
}

impl SuspendedCreationGuard {
    /// `requested_suspended` is the flag as the caller originally asked for
    /// it, before the interceptor forces it on for its own window.
    pub fn new(requested_suspended: bool) -> Self {
        Self { caller_wanted_running: !requested_suspended, resumed: false }
    }

    /// Whether the real OS call underneath must be made with the suspended
    /// flag forced on, regardless of what the caller asked for.
    pub fn forced_suspended_flag(&self) -> bool {
        true
    }

    /// Resume the new thread/process if and only if the caller's original
    /// intent was to have it running immediately. Idempotent.
    pub fn resume_if_caller_wanted_running(&mut self, resume: impl FnOnce()) {
        if self.caller_wanted_running && !self.resumed {
            resume();
            self.resumed = true;
        }
    }
}

/// The injector seam (spec.md §4.F), abstracted so `amon-interceptors` can
/// be unit-tested without a live `amon-inject` + Win32 target. The real
/// implementation is `amon_inject::ProcessInjector`; tests use
/// [`FakeInjector`] below style fakes supplied by the caller.
pub trait Injector {
    /// Cause `child_pid` to load the monitor library and join `session`,
    /// then block until it signals `monitoring_active` or the handshake
    /// times out. Returns `Ok(())` once the child has joined, or an error
    /// describing which of spec.md §4.F/§7's failure modes occurred.
    fn inject(&self, child_pid: u32, session: SessionId) -> Result<(), String>;
}

pub struct ProcessInterceptors<'a> {
    os: &'a dyn Os,
    injector: &'a dyn Injector,
}

impl<'a> ProcessInterceptors<'a> {
    pub fn new(os: &'a dyn Os, injector: &'a dyn Injector) -> Self {
        Self { os, injector }
    }

    /// Thread create within an already-monitored process (spec.md §4.E
    /// "Thread create"). `register` runs on the *new* thread, before
    /// `entry` — i.e. this models the trampoline the original wraps the
    /// caller's entry point in, not the `CreateThread` call itself (that
    /// stays in `winapi_patch`, which has the real function pointers to
    /// chain through).
    pub fn run_wrapped_thread_entry<R>(session: SessionId, entry: impl FnOnce() -> R) -> R {
        set_current_session(Some(session));
        let result = entry();
        set_current_session(None);
        result
    }

    /// Process create, monitored parent → child (spec.md §4.E "Process
    /// create"). Must run strictly after the child has been created
    /// suspended and strictly before it is resumed: records the child pid
    /// as a participant, then invokes the injector and blocks until it
    /// reports the child has joined (or a timeout/failure, which is logged
    /// under a debug aspect and does not fail the parent's call — spec.md
    /// §7, §4.F).
    pub fn on_create_process(&self, session: SessionId, child_pid: u32) -> Result<(), RegistryError> {
        SessionRegistry::global().add_participant(session, child_pid)?;
        if let Err(reason) = self.injector.inject(child_pid, session) {
            tracing::debug!(child_pid, session = session.get(), %reason, "monitoring injection failed; child runs unmonitored");
        }
        Ok(())
    }

    /// Thread/process exit or terminate (spec.md §4.E "exit, terminate"):
    /// deregister and emit no file event.
    pub fn on_exit_thread(&self) {
        set_current_session(None);
    }

    pub fn on_exit_process(&self, session: SessionId, pid: u32) -> Result<(), RegistryError> {
        SessionRegistry::global().remove_participant(session, pid)?;
        EventRouter::global().push_stop(session);
        Ok(())
    }

    /// Library load: no file event, logged only under the
    /// `RegisteredFunctions` debug aspect (spec.md §4.E "Library load") —
    /// both to this process's own operational log and, if the calling
    /// thread is inside a session, to that session's `Debug_<pid>.log`.
    pub fn on_load_library(&self, session_aspects: LogAspects, library_path: &str) {
        if session_aspects.contains(LogAspects::REGISTERED_FUNCTIONS) {
            tracing::debug!(library_path, "library loaded");
            if let Some(session) = current_session() {
                DebugLogRouter::global().record(
                    session,
                    LogAspects::REGISTERED_FUNCTIONS,
                    "library loaded",
                    &[("library_path", library_path.to_string())],
                );
            }
        }
        let _ = self.os.wall_clock_time();
    }
}
