// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identity and the session model (spec.md §3 "Session").
//!
//! A [`Session`] ties together the root build step and the tree of
//! descendant processes that join it: one per root build step, owning an
//! id, a workspace directory, diagnostic log aspects, and the set of
//! participant process ids. The session registry (`amon-engine`) is the
//! exclusive owner of `Session`s; this crate only models their shape.

use crate::aspects::LogAspects;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Dense, small, reusable session identifier.
///
/// Unlike an opaque `nanoid`-style id, a session id must be a
/// small integer allocated from a free list (spec.md §3): it names a
/// directory (`Session_<id>`) and is passed across the named handshake to
/// children as a plain number, so it needs to be compact and printable
/// without an allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u32);

impl SessionId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SessionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Names the per-child named handshake object (spec.md §6 "Named
/// handshake", §3 supplement).
///
/// The original source keys the handshake purely on process id
/// (`recordSessionContext(process, ...)` in `Session.h`), which races when
/// the OS reuses a pid before the parent has torn down a previous child's
/// handshake object. `HandshakeToken` additionally carries the session id
/// and a per-spawn sequence number so two children started in the same
/// process generation never collide, even if their pids did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandshakeToken {
    session: SessionId,
    child_pid: u32,
    sequence: u32,
}

impl HandshakeToken {
    pub fn new(session: SessionId, child_pid: u32, sequence: u32) -> Self {
        Self { session, child_pid, sequence }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn child_pid(&self) -> u32 {
        self.child_pid
    }

    /// The name under which the session context is published and the
    /// handshake event is waited on (spec.md §6).
    pub fn object_name(&self) -> String {
        format!("AccessMonitor_Session{}_Pid{}_{}", self.session.0, self.child_pid, self.sequence)
    }
}

impl fmt::Display for HandshakeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.object_name())
    }
}

/// One invocation of the access monitor, from root `start_session` to root
/// `stop_session` (spec.md §3 "Session").
///
/// The session registry (`amon-engine::SessionRegistry`) exclusively owns
/// live `Session`s; this type is the plain-data shape they're built from
/// and the shape handed across process boundaries in the named handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub directory: PathBuf,
    pub log_aspects: LogAspects,
    pub participants: BTreeSet<u32>,
}

impl Session {
    pub fn new(id: SessionId, directory: impl Into<PathBuf>, log_aspects: LogAspects) -> Self {
        Self { id, directory: directory.into(), log_aspects, participants: BTreeSet::new() }
    }

    /// Per-session directory: `<base>/AccessMonitorData/Session_<id>` (spec.md §6).
    pub fn session_directory(base: &Path, id: SessionId) -> PathBuf {
        base.join("AccessMonitorData").join(format!("Session_{}", id.0))
    }

    /// Path of this process's event file within the session directory.
    pub fn event_file_path(&self, pid: u32) -> PathBuf {
        self.directory.join(format!("Events_{pid}.log"))
    }

    /// Path of this process's debug log, present only when a log aspect is
    /// selected (spec.md §6 "Session directory layout").
    pub fn debug_file_path(&self, pid: u32) -> Option<PathBuf> {
        if self.log_aspects == LogAspects::NONE {
            None
        } else {
            Some(self.directory.join(format!("Debug_{pid}.log")))
        }
    }

    pub fn add_participant(&mut self, pid: u32) {
        self.participants.insert(pid);
    }

    pub fn remove_participant(&mut self, pid: u32) {
        self.participants.remove(&pid);
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
