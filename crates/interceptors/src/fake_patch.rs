// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic in-memory [`PatchOps`] for tests and `amon-cli`'s
//! dry-run mode — the same pattern as `amon_inject::ops::fake`.

use amon_engine::{PatchOps, Symbol};
use parking_lot::Mutex;
use std::collections::HashSet;

#[derive(Default)]
pub struct FakePatchOps {
    fail_on: Mutex<Option<&'static str>>,
    patched: Mutex<HashSet<Symbol>>,
}

impl FakePatchOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `patch` fail the first time it is called for `symbol`.
    pub fn failing_on(symbol: &'static str) -> Self {
        Self { fail_on: Mutex::new(Some(symbol)), patched: Mutex::new(HashSet::new()) }
    }

    pub fn currently_patched(&self) -> Vec<Symbol> {
        self.patched.lock().iter().copied().collect()
    }
}

impl PatchOps for FakePatchOps {
    fn patch(&self, symbol: Symbol) -> Result<(), String> {
        if *self.fail_on.lock() == Some(symbol.name) {
            return Err(format!("dry-run failure injected for {}", symbol.name));
        }
        self.patched.lock().insert(symbol);
        Ok(())
    }

    fn restore(&self, symbol: Symbol) -> Result<(), String> {
        self.patched.lock().remove(&symbol);
        Ok(())
    }
}
