// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! amon-inject: the injector (spec.md §4.F) — loads the monitor library
//! into a suspended target process and blocks until it joins the session.
//!
//! Like `amon-interceptors`, this is one of the two crates in the
//! workspace that opts out of `unsafe_code = "forbid"`: the real
//! implementation (`winapi_ops`, `cfg(windows)`) calls `OpenProcess`,
//! `VirtualAllocEx`, `WriteProcessMemory` and `CreateRemoteThread`
//! directly. The five-step contract itself lives in [`injector`] behind
//! the [`ops::RemoteProcessOps`] seam and is fully tested without any of
//! that.

pub mod error;
pub mod injector;
pub mod liveness;
pub mod ops;

#[cfg(windows)]
pub mod winapi_ops;

pub use error::InjectError;
pub use injector::ProcessInjector;
pub use ops::RemoteProcessOps;

#[cfg(windows)]
pub use winapi_ops::WinApiRemoteProcessOps;

#[cfg(windows)]
pub use liveness::process_is_alive;
