// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! amon-runtime: the public `start_session`/`stop_session` API (spec.md
//! §6) and the ambient stack behind it — environment configuration
//! (SPEC_FULL.md §6.3) and the participant-liveness seam `stop_session`
//! waits on (spec.md §5).
//!
//! Everything this crate needs to actually touch the OS — patching a
//! symbol, opening a remote process, probing whether a pid is still alive
//! — is received through a trait object the caller supplies
//! (`amon_engine::PatchOps`, `crate::waiter::ParticipantWaiter`); this
//! crate itself stays on the `unsafe_code = "forbid"` side of the
//! workspace, same as `amon-core`, `amon-wire`, `amon-engine` and
//! `amon-storage`.

pub mod config;
pub mod debug_log;
pub mod error;
pub mod monitor;
pub mod waiter;

pub use error::MonitorError;
pub use monitor::{start_session, stop_session, SessionRequest, StartOptions};
pub use waiter::{NoParticipantsWaiter, ParticipantWaiter, PollingWaiter};
