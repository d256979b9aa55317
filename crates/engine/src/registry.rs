// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The interceptor registry (spec.md §4.C).
//!
//! For each intercepted OS symbol the registry tracks a `(name,
//! replacement_fn, original_trampoline)` triple. This crate never touches a
//! raw function pointer or the loader's address table itself — that is
//! inherently `unsafe`, platform-specific work that belongs to
//! `amon-interceptors` (the one crate in this workspace that opts out of
//! `unsafe_code = "forbid"`). What lives here is the OS-agnostic
//! bookkeeping spec.md actually specifies as a *contract*: transactional
//! all-or-nothing install, refcounted installation shared by concurrent
//! sessions, and uninstall-on-last-release. The actual patch/restore calls
//! are delegated through the [`PatchOps`] seam, exactly the way
//! `amon-core::Clock` separates "what time is it" from "how do we know".

use crate::error::RegistryError;
use parking_lot::Mutex;
use std::sync::OnceLock;

/// One OS entry point the registry knows how to intercept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub name: &'static str,
}

impl Symbol {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

/// The platform-specific half of installation: patch a symbol's address
/// table entry to point at the monitor's replacement, or restore it.
/// Implemented over real Win32 IAT patching in `amon-interceptors`
/// (`cfg(windows)`) and over an in-memory fake in tests.
pub trait PatchOps: Send + Sync {
    fn patch(&self, symbol: Symbol) -> Result<(), String>;
    fn restore(&self, symbol: Symbol) -> Result<(), String>;
}

/// Returned by a successful `install` call. Carries no data beyond proving
/// the call succeeded; kept as a distinct type (rather than `()`) so a
/// future caller can attach Drop-based auto-uninstall without changing the
/// signature — a small typed return value instead of a bare unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallTransaction {
    pub became_installer: bool,
}

#[derive(Default)]
struct RegistryState {
    installed: bool,
    refcount: usize,
    patched: Vec<Symbol>,
}

/// Process-wide, initialized once, refcounted across concurrently live
/// sessions in the same process (spec.md §4.C "process-wide ... refcounted").
pub struct InterceptorRegistry {
    state: Mutex<RegistryState>,
}

impl InterceptorRegistry {
    fn new() -> Self {
        Self { state: Mutex::new(RegistryState::default()) }
    }

    /// The single process-wide instance.
    pub fn global() -> &'static InterceptorRegistry {
        static REGISTRY: OnceLock<InterceptorRegistry> = OnceLock::new();
        REGISTRY.get_or_init(InterceptorRegistry::new)
    }

    /// Install the given symbol set. If the registry is already installed
    /// (another live session shares this process), this call only bumps
    /// the refcount and returns without touching the OS. Otherwise it
    /// patches every symbol in order; a mid-set failure rolls back every
    /// symbol already patched in *this* transaction, leaving the process
    /// exactly as unpatched as it was on entry (spec.md §4.C
    /// "transactional ... all-or-nothing").
    pub fn install(
        &self,
        symbols: &[Symbol],
        ops: &dyn PatchOps,
    ) -> Result<InstallTransaction, RegistryError> {
        let mut state = self.state.lock();
        if state.installed {
            state.refcount += 1;
            return Ok(InstallTransaction { became_installer: false });
        }

        let mut patched = Vec::with_capacity(symbols.len());
        for &symbol in symbols {
            match ops.patch(symbol) {
                Ok(()) => patched.push(symbol),
                Err(reason) => {
                    for &done in patched.iter().rev() {
                        if let Err(rollback_reason) = ops.restore(done) {
                            tracing::warn!(
                                symbol = done.name,
                                reason = rollback_reason,
                                "failed to roll back symbol after install failure"
                            );
                        }
                    }
                    return Err(RegistryError::PatchFailed { symbol: symbol.name.to_string(), reason });
                }
            }
        }

        state.installed = true;
        state.refcount = 1;
        state.patched = patched;
        Ok(InstallTransaction { became_installer: true })
    }

    /// Release one session's hold on the installation. Only the last
    /// release actually restores the original address-table entries.
    pub fn uninstall(&self, ops: &dyn PatchOps) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        if !state.installed {
            return Err(RegistryError::NotInstalled);
        }
        state.refcount -= 1;
        if state.refcount == 0 {
            let patched = std::mem::take(&mut state.patched);
            for symbol in patched.into_iter().rev() {
                if let Err(reason) = ops.restore(symbol) {
                    return Err(RegistryError::RollbackFailed { symbol: symbol.name.to_string(), reason });
                }
            }
            state.installed = false;
        }
        Ok(())
    }

    pub fn is_installed(&self) -> bool {
        self.state.lock().installed
    }

    pub fn refcount(&self) -> usize {
        self.state.lock().refcount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingOps {
        patch_calls: AtomicUsize,
        restore_calls: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    impl CountingOps {
        fn new() -> Self {
            Self { patch_calls: AtomicUsize::new(0), restore_calls: AtomicUsize::new(0), fail_on: None }
        }

        fn failing_on(name: &'static str) -> Self {
            Self { fail_on: Some(name), ..Self::new() }
        }
    }

    impl PatchOps for CountingOps {
        fn patch(&self, symbol: Symbol) -> Result<(), String> {
            self.patch_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(symbol.name) {
                return Err(format!("injected failure for {}", symbol.name));
            }
            Ok(())
        }

        fn restore(&self, _symbol: Symbol) -> Result<(), String> {
            self.restore_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fresh_registry() -> InterceptorRegistry {
        InterceptorRegistry::new()
    }

    #[test]
    fn install_patches_every_symbol_once() {
        let registry = fresh_registry();
        let ops = CountingOps::new();
        let symbols = [Symbol::new("CreateFileW"), Symbol::new("DeleteFileW")];
        let tx = registry.install(&symbols, &ops).unwrap();
        assert!(tx.became_installer);
        assert_eq!(ops.patch_calls.load(Ordering::SeqCst), 2);
        assert!(registry.is_installed());
    }

    #[test]
    fn second_session_shares_installation_via_refcount() {
        let registry = fresh_registry();
        let ops = CountingOps::new();
        let symbols = [Symbol::new("CreateFileW")];
        let first = registry.install(&symbols, &ops).unwrap();
        let second = registry.install(&symbols, &ops).unwrap();
        assert!(first.became_installer);
        assert!(!second.became_installer);
        assert_eq!(ops.patch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.refcount(), 2);
    }

    #[test]
    fn uninstall_only_restores_on_last_release() {
        let registry = fresh_registry();
        let ops = CountingOps::new();
        let symbols = [Symbol::new("CreateFileW")];
        registry.install(&symbols, &ops).unwrap();
        registry.install(&symbols, &ops).unwrap();

        registry.uninstall(&ops).unwrap();
        assert_eq!(ops.restore_calls.load(Ordering::SeqCst), 0);
        assert!(registry.is_installed());

        registry.uninstall(&ops).unwrap();
        assert_eq!(ops.restore_calls.load(Ordering::SeqCst), 1);
        assert!(!registry.is_installed());
    }

    #[test]
    fn failed_install_rolls_back_already_patched_symbols() {
        let registry = fresh_registry();
        let ops = CountingOps::failing_on("DeleteFileW");
        let symbols = [Symbol::new("CreateFileW"), Symbol::new("DeleteFileW"), Symbol::new("MoveFileExW")];
        let result = registry.install(&symbols, &ops);
        assert!(result.is_err());
        assert!(!registry.is_installed());
        // CreateFileW was patched then rolled back; MoveFileExW never attempted.
        assert_eq!(ops.patch_calls.load(Ordering::SeqCst), 2);
        assert_eq!(ops.restore_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn uninstall_without_install_is_an_error() {
        let registry = fresh_registry();
        let ops = CountingOps::new();
        assert!(matches!(registry.uninstall(&ops), Err(RegistryError::NotInstalled)));
    }
}
