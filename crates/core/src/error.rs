// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data-model level errors (spec.md §6.2 ambient error-handling stack).

use thiserror::Error;

/// Errors raised by `amon-core`'s own invariants, as opposed to OS or I/O
/// failures raised further up the stack.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("malformed mode token string: {0:?}")]
    MalformedModeString(String),

    #[error("reentrant fold on path {path:?}: a fold was already in progress on this thread")]
    ReentrantFold { path: String },

    #[error("no free session id available: {in_use} sessions already live in this process")]
    SessionIdsExhausted { in_use: usize },

    #[error("unknown session id {0}")]
    UnknownSession(u32),
}
