// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-session debug log (SPEC_FULL.md §6.1): `Debug_<pid>.log`, a
//! `tracing_appender::non_blocking` writer behind [`amon_engine::DebugSink`],
//! registered with [`amon_engine::DebugLogRouter`] under the session's id
//! for the length of its lifetime. Kept separate from the root process's
//! own `tracing_subscriber::fmt` diagnostics (`crate::config::log_filter`)
//! so a session's debug log never contends with — or gets filtered by —
//! this process's unrelated operational logging.

use amon_core::{Clock, LogAspects, Session, SystemClock};
use amon_engine::{DebugLogRouter, DebugSink};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

/// Opens the session's `Debug_<pid>.log` and registers it with the
/// process-wide router, or does nothing if no log aspect was selected
/// (spec.md §3 "a debug log (enabled by `log_aspects`)"). Returns the
/// `WorkerGuard` the caller must keep alive for the session's duration —
/// dropping it flushes and closes the non-blocking writer — or `None` if
/// there was nothing to open.
pub fn install(session: &Session, pid: u32) -> io::Result<Option<WorkerGuard>> {
    let Some(path) = session.debug_file_path(pid) else { return Ok(None) };
    let (sink, guard) = FileDebugSink::open(&path)?;
    DebugLogRouter::global().register(session.id, session.log_aspects, Arc::new(sink));
    Ok(Some(guard))
}

/// Drops the session's router entry. The caller separately drops the
/// `WorkerGuard` `install` returned, which is what actually flushes the
/// file to disk.
pub fn uninstall(session_id: amon_core::SessionId) {
    DebugLogRouter::global().unregister(session_id);
}

struct FileDebugSink {
    writer: NonBlocking,
}

impl FileDebugSink {
    fn open(path: &Path) -> io::Result<(Self, WorkerGuard)> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        Ok((Self { writer }, guard))
    }
}

impl DebugSink for FileDebugSink {
    fn record(&self, aspect: LogAspects, message: &str, fields: &[(&'static str, String)]) {
        let mut line = format!("{} [{aspect}] {message}", SystemClock.wall_clock_time());
        for (key, value) in fields {
            let _ = write!(line, " {key}={value}");
        }
        line.push('\n');
        let mut writer = self.writer.clone();
        let _ = writer.write_all(line.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amon_core::SessionId;

    #[test]
    fn install_is_a_noop_when_no_aspect_is_selected() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(SessionId::new(1), dir.path().join("AccessMonitorData/Session_1"), LogAspects::NONE);
        let guard = install(&session, 4242).unwrap();
        assert!(guard.is_none());
        assert!(!DebugLogRouter::global().is_registered(session.id));
    }

    #[test]
    fn install_opens_the_file_and_registers_with_the_router() {
        let dir = tempfile::tempdir().unwrap();
        let directory = dir.path().join("AccessMonitorData/Session_2");
        let session = Session::new(SessionId::new(2), &directory, LogAspects::FILE_ACCESSES);

        let guard = install(&session, 777).unwrap();
        assert!(guard.is_some());
        assert!(DebugLogRouter::global().is_registered(session.id));

        DebugLogRouter::global().record(session.id, LogAspects::FILE_ACCESSES, "probe", &[("path", "/w/a.txt".to_string())]);
        drop(guard);
        uninstall(session.id);

        let contents = std::fs::read_to_string(directory.join("Debug_777.log")).unwrap();
        assert!(contents.contains("[FileAccesses] probe"));
        assert!(contents.contains("path=/w/a.txt"));
    }

    #[test]
    fn record_of_a_disabled_aspect_never_reaches_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let directory = dir.path().join("AccessMonitorData/Session_3");
        let session = Session::new(SessionId::new(3), &directory, LogAspects::FILE_ACCESSES);

        let guard = install(&session, 778).unwrap();
        DebugLogRouter::global().record(session.id, LogAspects::WRITE_TIME, "should not land", &[]);
        drop(guard);
        uninstall(session.id);

        let contents = std::fs::read_to_string(directory.join("Debug_778.log")).unwrap_or_default();
        assert!(!contents.contains("should not land"));
    }
}
