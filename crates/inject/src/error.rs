// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// The five failure modes spec.md §4.F/§7 names for injection, plus the
/// handshake timeout spec.md §5 "Suspension points" calls out separately.
/// None of these abort the parent's call: spec.md §7 "Injection failure"
/// treats the whole family as locally recoverable — the child just runs
/// unmonitored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InjectError {
    #[error("failed to open target process {pid}")]
    OpenProcessFailed { pid: u32 },

    #[error("failed to allocate memory in target process {pid}")]
    AllocationFailed { pid: u32 },

    #[error("failed to write monitor library path into target process {pid}")]
    WriteMemoryFailed { pid: u32 },

    #[error("failed to resolve the remote loader entry point")]
    LoaderEntryPointUnavailable,

    #[error("failed to create a remote thread in target process {pid}")]
    RemoteThreadFailed { pid: u32 },

    #[error("handshake for process {pid} timed out after {timeout_ms}ms waiting for monitoring_active")]
    HandshakeTimedOut { pid: u32, timeout_ms: u64 },
}
