// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The top-level error returned by `start_session`/`stop_session`
//! (SPEC_FULL.md §6.2), aggregating every lower-level error type in the
//! workspace via `#[from]`, flattening every collaborator crate's error
//! type into one top-level enum the caller can match on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Registry(#[from] amon_engine::RegistryError),

    #[error(transparent)]
    Collector(#[from] amon_storage::CollectorError),

    #[error("failed to create session directory {path}: {source}")]
    SessionDirectoryUnwritable { path: String, #[source] source: std::io::Error },

    #[error("interceptor install failed for this session: {0}")]
    InstallFailed(String),

    #[error("session {0} is not live in this process")]
    UnknownSession(u32),
}
