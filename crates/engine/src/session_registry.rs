// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session registry (spec.md §4.G).
//!
//! State: `session-id → Session`, a free list of reusable ids, a monotonic
//! next-id counter, all behind one mutex; plus a process-local,
//! thread-local `thread-id → session-id` lookup that is lock-free. The
//! "inside monitor" reentrancy flag (spec.md §4.B, §4.C, §9) is co-located
//! in the *same* thread-local cell as the session pointer — one TLS slot,
//! not two, and both die together when the thread exits.

use crate::error::RegistryError;
use amon_core::{LogAspects, Session, SessionId};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Default)]
struct ThreadContext {
    session: Option<SessionId>,
    inside_monitor: bool,
}

thread_local! {
    static THREAD_CTX: RefCell<ThreadContext> = RefCell::new(ThreadContext::default());
}

/// The session this thread is currently a member of, if any. Lock-free:
/// pure thread-local read (spec.md §4.G "Concurrency").
pub fn current_session() -> Option<SessionId> {
    THREAD_CTX.with(|ctx| ctx.borrow().session)
}

/// Bind (or unbind, with `None`) the calling thread to a session. Called by
/// the thread-create interceptor wrapper when registering a new thread
/// with the session it was spawned under (spec.md §4.E).
pub fn set_current_session(id: Option<SessionId>) {
    THREAD_CTX.with(|ctx| ctx.borrow_mut().session = id);
}

/// Whether this thread is currently inside a replacement body (spec.md
/// §4.C "Reentrancy guard"). Only `amon_engine::ReentrancyGuard` should
/// flip this; it is `pub(crate)` for exactly that reason.
pub(crate) fn is_inside_monitor() -> bool {
    THREAD_CTX.with(|ctx| ctx.borrow().inside_monitor)
}

pub(crate) fn set_inside_monitor(value: bool) {
    THREAD_CTX.with(|ctx| ctx.borrow_mut().inside_monitor = value);
}

#[derive(Default)]
struct RegistryState {
    sessions: HashMap<SessionId, Session>,
    free_ids: Vec<u32>,
    next_id: u32,
}

/// Process-wide map of live sessions. Each process has its own instance;
/// identity of a session across processes is by id alone (spec.md §4.G
/// "Cross-process semantics").
pub struct SessionRegistry {
    state: Mutex<RegistryState>,
}

impl SessionRegistry {
    fn new() -> Self {
        Self { state: Mutex::new(RegistryState::default()) }
    }

    pub fn global() -> &'static SessionRegistry {
        static REGISTRY: OnceLock<SessionRegistry> = OnceLock::new();
        REGISTRY.get_or_init(SessionRegistry::new)
    }

    /// Allocate a session id (from the free list, or the next integer) and
    /// register a new, empty session rooted at `base_directory`. Called by
    /// the root process when the build step starts.
    pub fn create_session(&self, base_directory: PathBuf, log_aspects: LogAspects) -> SessionId {
        let mut state = self.state.lock();
        let raw_id = state.free_ids.pop().unwrap_or_else(|| {
            let id = state.next_id;
            state.next_id += 1;
            id
        });
        let id = SessionId::new(raw_id);
        let directory = Session::session_directory(&base_directory, id);
        state.sessions.insert(id, Session::new(id, directory, log_aspects));
        id
    }

    /// Join an existing session by id, as a child process does at
    /// library-load time after retrieving the handshake payload. Idempotent
    /// if this process has already joined.
    pub fn join_session(&self, id: SessionId, directory: PathBuf, log_aspects: LogAspects) {
        let mut state = self.state.lock();
        state.sessions.entry(id).or_insert_with(|| Session::new(id, directory, log_aspects));
    }

    /// Remove a session, returning its final state. Frees the id for reuse
    /// by a future `create_session` (spec.md §3 "reusable after the
    /// session terminates").
    pub fn remove_session(&self, id: SessionId) -> Result<Session, RegistryError> {
        let mut state = self.state.lock();
        let session = state.sessions.remove(&id).ok_or(RegistryError::UnknownSession(id.get()))?;
        state.free_ids.push(id.get());
        Ok(session)
    }

    pub fn add_participant(&self, id: SessionId, pid: u32) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        let session = state.sessions.get_mut(&id).ok_or(RegistryError::UnknownSession(id.get()))?;
        session.add_participant(pid);
        Ok(())
    }

    pub fn remove_participant(&self, id: SessionId, pid: u32) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        let session = state.sessions.get_mut(&id).ok_or(RegistryError::UnknownSession(id.get()))?;
        session.remove_participant(pid);
        Ok(())
    }

    /// A point-in-time copy of a session's state, for callers that need to
    /// read it (the injector staging a handshake, the collector folding a
    /// finished session) without holding the registry lock.
    pub fn snapshot(&self, id: SessionId) -> Option<Session> {
        self.state.lock().sessions.get(&id).cloned()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.state.lock().sessions.contains_key(&id)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_dense_increasing_ids() {
        let registry = SessionRegistry::new();
        let a = registry.create_session(PathBuf::from("/tmp/amt"), LogAspects::NONE);
        let b = registry.create_session(PathBuf::from("/tmp/amt"), LogAspects::NONE);
        assert_eq!(a.get(), 0);
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn removed_ids_are_reused() {
        let registry = SessionRegistry::new();
        let a = registry.create_session(PathBuf::from("/tmp/amt"), LogAspects::NONE);
        registry.remove_session(a).unwrap();
        let b = registry.create_session(PathBuf::from("/tmp/amt"), LogAspects::NONE);
        assert_eq!(a, b);
    }

    #[test]
    fn join_session_is_idempotent() {
        let registry = SessionRegistry::new();
        let id = SessionId::new(7);
        registry.join_session(id, PathBuf::from("/tmp/amt/AccessMonitorData/Session_7"), LogAspects::NONE);
        registry.add_participant(id, 100).unwrap();
        registry.join_session(id, PathBuf::from("/tmp/amt/AccessMonitorData/Session_7"), LogAspects::NONE);
        let snap = registry.snapshot(id).unwrap();
        assert!(snap.participants.contains(&100));
    }

    #[test]
    fn remove_unknown_session_is_an_error() {
        let registry = SessionRegistry::new();
        assert!(matches!(registry.remove_session(SessionId::new(99)), Err(RegistryError::UnknownSession(99))));
    }

    #[test]
    fn thread_local_session_binding_round_trips() {
        assert_eq!(current_session(), None);
        set_current_session(Some(SessionId::new(3)));
        assert_eq!(current_session(), Some(SessionId::new(3)));
        set_current_session(None);
        assert_eq!(current_session(), None);
    }
}
