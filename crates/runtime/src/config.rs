// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment-variable configuration (SPEC_FULL.md §6.3):
//! one function per variable, a documented default, and an explicit
//! `start_session` option always shadowing the environment default rather
//! than the reverse.

use amon_core::LogAspects;
use std::path::PathBuf;
use std::time::Duration;

/// Root under which `AccessMonitorData/` is created when `start_session`'s
/// `directory` option is omitted. `AMON_BASE_DIR` > `$TMPDIR`/`%TEMP%`.
pub fn base_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AMON_BASE_DIR") {
        return PathBuf::from(dir);
    }
    std::env::temp_dir()
}

/// Default log-aspect bit-set when `start_session` omits `log_aspects`.
pub fn log_aspects() -> LogAspects {
    std::env::var("AMON_LOG_ASPECTS").map(|names| LogAspects::from_names(&names)).unwrap_or(LogAspects::NONE)
}

/// Default injector handshake timeout (spec.md §6 "handshake_timeout").
pub fn handshake_timeout() -> Duration {
    std::env::var("AMON_HANDSHAKE_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// `tracing` `EnvFilter` string for the root process's own operational
/// diagnostics (SPEC_FULL.md §6.1) — distinct from the per-session
/// event/debug logs, which are not gated by this.
pub fn log_filter() -> String {
    std::env::var("AMON_LOG").unwrap_or_else(|_| "info".to_string())
}
