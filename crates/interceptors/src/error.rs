// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterceptError {
    #[error("failed to resolve handle {handle:#x} to a path")]
    HandleNotTracked { handle: usize },

    #[error("suspended-creation bookkeeping failed: {0}")]
    SuspendedCreation(String),

    #[error("registry error: {0}")]
    Registry(#[from] amon_engine::RegistryError),
}
