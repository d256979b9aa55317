// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("failed to read session directory {path}: {source}")]
    SessionDirectoryUnreadable { path: String, #[source] source: std::io::Error },

    #[error("failed to open event file {path}: {source}")]
    EventFileUnreadable { path: String, #[source] source: std::io::Error },

    #[error("failed to write to event file {path}: {source}")]
    EventFileWriteFailed { path: String, #[source] source: std::io::Error },
}
