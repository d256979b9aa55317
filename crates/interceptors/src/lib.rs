// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! amon-interceptors: the replacement bodies for file, directory,
//! thread and process OS entry points (spec.md §4.D, §4.E), and the `Os`
//! seam that lets them be unit-tested without a live Windows target
//! (spec.md §7.1 testability seam, supplement).
//!
//! This is the one crate (with `amon-inject`) that opts out of the
//! workspace's `unsafe_code = "forbid"` lint: real IAT patching and
//! `windows-sys` FFI calls are inherently `unsafe`, and the actual
//! contract under test — transactional install, path resolution, event
//! emission — is what's tested; the `unsafe` blocks themselves are kept
//! as small and as close to the raw Win32 call as possible, behind
//! `cfg(windows)`.

pub mod access_flags;
pub mod error;

#[cfg(any(test, feature = "fake"))]
pub mod fake_patch;

pub mod file;
pub mod os;
pub mod process;
pub mod symbols;

#[cfg(windows)]
pub mod winapi_patch;

pub use access_flags::{project_open_mode, DesiredAccess};
pub use error::InterceptError;

#[cfg(any(test, feature = "fake"))]
pub use fake_patch::FakePatchOps;

pub use file::FileInterceptors;
pub use os::{FakeOs, Os};
pub use process::{ProcessInterceptors, SuspendedCreationGuard};
pub use symbols::intercepted_symbols;

#[cfg(windows)]
pub use winapi_patch::{WinApiPatchOps, WindowsOs};
