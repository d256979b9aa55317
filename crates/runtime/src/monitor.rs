// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The top-level API the build driver sees (spec.md §6 "Top-level API"):
//! `start_session` / `stop_session`. This module is the one place in the
//! workspace that wires every other component together — session registry
//! (G), interceptor registry (C), event queue (B) and router, drainer and
//! collector (H) — into the single call each side of a build step makes.

use crate::error::MonitorError;
use crate::waiter::ParticipantWaiter;
use amon_core::{AccessRecord, LogAspects, Session, SessionId};
use amon_engine::{
    current_session, set_current_session, EventQueue, EventRouter, InterceptorRegistry, PatchOps,
    SessionRegistry,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::thread::JoinHandle;

/// `start_session`'s `id` option (spec.md §6 "Configuration surface"):
/// either allocate a fresh id, or join an id the parent already
/// communicated across the named handshake (child processes only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    New,
    Existing(SessionId),
}

/// Explicit `start_session` options; any field left `None` falls back to
/// the corresponding `crate::config` environment default (SPEC_FULL.md
/// §6.3 — "an explicit per-call argument shadows an environment default").
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    pub directory: Option<PathBuf>,
    pub log_aspects: Option<LogAspects>,
}

struct LiveSession {
    session_directory: PathBuf,
    queue: EventQueue,
    drainer: Option<JoinHandle<()>>,
    pid: u32,
    debug_log: Option<tracing_appender::non_blocking::WorkerGuard>,
}

fn live_sessions() -> &'static Mutex<HashMap<SessionId, LiveSession>> {
    static LIVE: OnceLock<Mutex<HashMap<SessionId, LiveSession>>> = OnceLock::new();
    LIVE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Creates the session, installs interceptors in the current process on
/// first session (refcounted — spec.md §4.C), starts this process's
/// drainer thread, binds the calling thread into the session, and returns
/// the id (spec.md §6).
pub fn start_session(
    options: StartOptions,
    request: SessionRequest,
    symbols: &[amon_engine::Symbol],
    ops: &dyn PatchOps,
) -> Result<SessionId, MonitorError> {
    let base_directory = options.directory.unwrap_or_else(crate::config::base_dir);
    let log_aspects = options.log_aspects.unwrap_or_else(crate::config::log_aspects);

    let registry = SessionRegistry::global();
    let id = match request {
        SessionRequest::New => registry.create_session(base_directory.clone(), log_aspects),
        SessionRequest::Existing(id) => {
            let directory = Session::session_directory(&base_directory, id);
            registry.join_session(id, directory, log_aspects);
            id
        }
    };
    let session = registry.snapshot(id).ok_or(MonitorError::UnknownSession(id.get()))?;

    std::fs::create_dir_all(&session.directory).map_err(|source| MonitorError::SessionDirectoryUnwritable {
        path: session.directory.display().to_string(),
        source,
    })?;

    InterceptorRegistry::global().install(symbols, ops)?;

    let pid = std::process::id();
    let debug_log = crate::debug_log::install(&session, pid).unwrap_or_else(|error| {
        tracing::debug!(error = %error, "failed to open per-session debug log; continuing without it");
        None
    });

    let (queue, receiver) = EventQueue::new();
    EventRouter::global().register(id, queue.clone());
    registry.add_participant(id, pid).map_err(MonitorError::Registry)?;
    set_current_session(Some(id));

    let event_file_path = session.event_file_path(pid);
    let drainer = std::thread::Builder::new()
        .name(format!("amon-drainer-{id}"))
        .spawn(move || amon_storage::drainer::run(receiver, event_file_path))
        .ok();

    live_sessions()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .insert(id, LiveSession { session_directory: session.directory, queue, drainer, pid, debug_log });

    Ok(id)
}

/// Pushes the stop sentinel, waits for this process's drainer to flush and
/// for every surviving participant to exit, folds every event file in the
/// session directory, and returns the per-path map (spec.md §6). Uninstalls
/// interceptors in this process on the last concurrently live session
/// (spec.md §4.C refcounting).
pub fn stop_session(
    id: SessionId,
    waiter: &dyn ParticipantWaiter,
    ops: &dyn PatchOps,
) -> Result<HashMap<PathBuf, AccessRecord>, MonitorError> {
    let live = live_sessions()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .remove(&id)
        .ok_or(MonitorError::UnknownSession(id.get()))?;

    live.queue.push_stop();
    if let Some(handle) = live.drainer {
        let _ = handle.join();
    }
    EventRouter::global().unregister(id);
    crate::debug_log::uninstall(id);
    drop(live.debug_log);

    if current_session() == Some(id) {
        set_current_session(None);
    }

    let registry = SessionRegistry::global();
    registry.remove_participant(id, live.pid).map_err(MonitorError::Registry)?;

    if let Some(session) = registry.snapshot(id) {
        for pid in session.participants {
            waiter.wait_for_exit(pid);
        }
    }

    let map = amon_storage::fold_session(&live.session_directory)?;

    InterceptorRegistry::global().uninstall(ops).map_err(MonitorError::Registry)?;
    registry.remove_session(id).map_err(MonitorError::Registry)?;

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waiter::NoParticipantsWaiter;
    use amon_core::AccessMode;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoopPatchOps {
        patched: AtomicUsize,
    }

    impl NoopPatchOps {
        fn new() -> Self {
            Self { patched: AtomicUsize::new(0) }
        }
    }

    impl PatchOps for NoopPatchOps {
        fn patch(&self, _symbol: amon_engine::Symbol) -> Result<(), String> {
            self.patched.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn restore(&self, _symbol: amon_engine::Symbol) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    #[serial]
    fn start_then_stop_round_trips_with_no_events() {
        let dir = tempfile::tempdir().unwrap();
        let ops = NoopPatchOps::new();
        let symbols = [amon_engine::Symbol::new("CreateFileW")];

        let id = start_session(
            StartOptions { directory: Some(dir.path().to_path_buf()), log_aspects: None },
            SessionRequest::New,
            &symbols,
            &ops,
        )
        .unwrap();

        let map = stop_session(id, &NoParticipantsWaiter, &ops).unwrap();
        assert!(map.is_empty());
        assert_eq!(current_session(), None);
    }

    #[test]
    #[serial]
    fn events_emitted_while_the_session_is_live_are_folded_on_stop() {
        let dir = tempfile::tempdir().unwrap();
        let ops = NoopPatchOps::new();
        let symbols = [amon_engine::Symbol::new("CreateFileW")];

        let id = start_session(
            StartOptions { directory: Some(dir.path().to_path_buf()), log_aspects: None },
            SessionRequest::New,
            &symbols,
            &ops,
        )
        .unwrap();

        let event = amon_core::RawEvent::new(
            PathBuf::from("/w/a.txt"),
            AccessMode::WRITE,
            amon_core::FileTime::from_epoch_ms(0),
            true,
        );
        EventRouter::global().push(id, event);

        let map = stop_session(id, &NoParticipantsWaiter, &ops).unwrap();
        let record = map.get(&PathBuf::from("/w/a.txt")).unwrap();
        assert_eq!(record.effective_mode, AccessMode::WRITE);
    }

    #[test]
    #[serial]
    fn stopping_an_unknown_session_is_an_error() {
        let ops = NoopPatchOps::new();
        let result = stop_session(SessionId::new(999_999), &NoParticipantsWaiter, &ops);
        assert!(matches!(result, Err(MonitorError::UnknownSession(999_999))));
    }
}
