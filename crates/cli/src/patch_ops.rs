// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Picks the real Win32 `PatchOps` on Windows, or the in-memory
//! `FakePatchOps` everywhere else, so `amon run` exercises the same
//! `start_session`/`stop_session` contract on every platform — the real
//! patches just never touch a process-wide IAT off Windows (spec.md §7.1
//! supplement, "tests and `amon-cli`'s dry-run mode use `FakeOs`").

use amon_engine::PatchOps;

#[cfg(windows)]
pub fn default_ops() -> Box<dyn PatchOps> {
    Box::new(amon_interceptors::WinApiPatchOps::new())
}

#[cfg(not(windows))]
pub fn default_ops() -> Box<dyn PatchOps> {
    Box::new(amon_interceptors::FakePatchOps::new())
}
