// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to patch symbol {symbol}: {reason}")]
    PatchFailed { symbol: String, reason: String },

    #[error("failed to restore symbol {symbol} during rollback: {reason}")]
    RollbackFailed { symbol: String, reason: String },

    #[error("interceptor registry already installed for this process")]
    AlreadyInstalled,

    #[error("interceptor registry is not installed")]
    NotInstalled,

    #[error("session {0} is already live in this process")]
    SessionAlreadyLive(u32),

    #[error("unknown session id {0}")]
    UnknownSession(u32),

    #[error("session ids exhausted: {in_use} sessions already live")]
    SessionIdsExhausted { in_use: usize },
}
