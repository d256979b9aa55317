// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! amon-storage: the event collector (spec.md §4.H) — the per-process
//! drainer thread that turns a session's event queue into an on-disk event
//! file, and the per-session fold that turns a directory of those files
//! back into the final path → [`amon_core::AccessRecord`] map.

pub mod collector;
pub mod drainer;
pub mod error;

pub use collector::{fold_file, fold_session, fold_streaming, PathRecordMap};
pub use error::CollectorError;
