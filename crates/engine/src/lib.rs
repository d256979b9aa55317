// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! amon-engine: the in-process machinery the interceptors and the public
//! API share — the event queue (B), the interceptor registry (C), the
//! session registry (G), the per-thread reentrancy guard that ties C and G
//! together (spec.md §4.B, §4.C, §4.G, §9), and the debug-log router that
//! gives the same cross-thread session lookup to the aspect-gated debug
//! log (spec.md §6 "Diagnostic log aspects").

pub mod debug_log;
pub mod error;
pub mod queue;
pub mod reentrancy;
pub mod registry;
pub mod router;
pub mod session_registry;

pub use debug_log::{DebugLogRouter, DebugSink};
pub use error::RegistryError;
pub use queue::{EventQueue, EventQueueReceiver, QueueItem};
pub use reentrancy::ReentrancyGuard;
pub use registry::{InstallTransaction, InterceptorRegistry, PatchOps, Symbol};
pub use router::EventRouter;
pub use session_registry::{current_session, set_current_session, SessionRegistry};
