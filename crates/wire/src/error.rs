// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed event record: {0:?}")]
    MalformedRecord(String),

    #[error("malformed timestamp {0:?}")]
    MalformedTimestamp(String),

    #[error("handshake payload error: {0}")]
    Handshake(#[from] serde_json::Error),
}
