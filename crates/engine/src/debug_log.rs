// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routes an aspect-tagged debug event to the debug-log sink of the
//! session it belongs to, mirroring [`crate::router::EventRouter`]: an
//! interceptor replacement body only knows the calling thread's
//! `current_session()` id, not a sink handle, so this is the process-wide
//! table that closes that gap for the debug log the same way `EventRouter`
//! closes it for the event queue (spec.md §6 "Diagnostic log aspects").
//!
//! The sink itself — opening `Debug_<pid>.log`, the `tracing_appender`
//! writer behind it — is [`amon_runtime::debug_log`]'s job; this crate
//! only knows the [`DebugSink`] trait object, so it never needs a
//! `tracing-appender`/`tracing-subscriber` dependency of its own.

use amon_core::{LogAspects, SessionId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// A session's debug-log destination. `record` is only ever called for an
/// aspect the router has already confirmed is enabled for this session —
/// implementors don't re-check `log_aspects` themselves.
pub trait DebugSink: Send + Sync {
    fn record(&self, aspect: LogAspects, message: &str, fields: &[(&'static str, String)]);
}

#[derive(Default)]
pub struct DebugLogRouter {
    sinks: Mutex<HashMap<SessionId, (LogAspects, Arc<dyn DebugSink>)>>,
}

impl DebugLogRouter {
    pub fn global() -> &'static DebugLogRouter {
        static ROUTER: OnceLock<DebugLogRouter> = OnceLock::new();
        ROUTER.get_or_init(DebugLogRouter::default)
    }

    /// Register a session's sink and the aspect bit-set it was opened
    /// with. Called once by `amon-runtime::start_session`, if and only if
    /// the session selected at least one aspect (spec.md §3 "a debug log
    /// (enabled by `log_aspects`)" — a session with no aspects selected
    /// never gets an entry here, so `record` is a guaranteed no-op for it).
    pub fn register(&self, id: SessionId, aspects: LogAspects, sink: Arc<dyn DebugSink>) {
        self.sinks.lock().insert(id, (aspects, sink));
    }

    pub fn unregister(&self, id: SessionId) {
        self.sinks.lock().remove(&id);
    }

    /// Record one event under `aspect`, if `id` has a sink registered and
    /// that sink's session selected `aspect`. Silently dropped otherwise —
    /// same policy as `EventRouter::push` for an unregistered session.
    pub fn record(&self, id: SessionId, aspect: LogAspects, message: &str, fields: &[(&'static str, String)]) {
        let entry = self.sinks.lock().get(&id).filter(|(aspects, _)| aspects.contains(aspect)).map(|(_, sink)| sink.clone());
        if let Some(sink) = entry {
            sink.record(aspect, message, fields);
        }
    }

    pub fn is_registered(&self, id: SessionId) -> bool {
        self.sinks.lock().contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<(LogAspects, String)>>,
    }

    impl DebugSink for RecordingSink {
        fn record(&self, aspect: LogAspects, message: &str, _fields: &[(&'static str, String)]) {
            self.calls.lock().push((aspect, message.to_string()));
        }
    }

    #[test]
    fn record_reaches_the_sink_only_for_an_enabled_aspect() {
        let router = DebugLogRouter::default();
        let sink = Arc::new(RecordingSink::default());
        let id = SessionId::new(1);
        router.register(id, LogAspects::FILE_ACCESSES, sink.clone());

        router.record(id, LogAspects::FILE_ACCESSES, "file touched", &[]);
        router.record(id, LogAspects::WRITE_TIME, "write time resolved", &[]);

        assert_eq!(sink.calls.lock().len(), 1);
        assert_eq!(sink.calls.lock()[0].1, "file touched");
    }

    #[test]
    fn record_on_an_unregistered_session_is_a_noop() {
        let router = DebugLogRouter::default();
        router.record(SessionId::new(99), LogAspects::FILE_ACCESSES, "nothing", &[]);
        assert!(!router.is_registered(SessionId::new(99)));
    }

    #[test]
    fn unregister_drops_the_sink() {
        let router = DebugLogRouter::default();
        let sink = Arc::new(RecordingSink::default());
        let id = SessionId::new(2);
        router.register(id, LogAspects::FILE_ACCESSES, sink.clone());
        router.unregister(id);
        router.record(id, LogAspects::FILE_ACCESSES, "file touched", &[]);
        assert!(sink.calls.lock().is_empty());
    }
}
