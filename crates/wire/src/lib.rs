// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! amon-wire: the two cross-boundary text formats of the access monitor.
//!
//! 1. The **event file** format (spec.md §6): one text record per raw
//!    access event, written by a process's drainer thread and read back by
//!    the collector's fold, across process and even host-upgrade
//!    boundaries — so it is a stable, hand-parsed format, not `serde_json`.
//! 2. The **handshake payload** (spec.md §6 "Named handshake"): the small
//!    struct a parent publishes for a child to retrieve at library-load
//!    time. This one *is* `serde_json`, because it never outlives a
//!    single process's lifetime and has no backward-compatibility
//!    obligation the event file has.

mod error;
mod event_file;
mod handshake;

pub use error::WireError;
pub use event_file::{format_record, parse_record, ParsedRecord};
pub use handshake::HandshakePayload;
