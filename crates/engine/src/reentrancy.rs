// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reentrancy guard (spec.md §4.B "Reentrancy guard", §4.C, §5
//! "Error-code transparency").
//!
//! While an interceptor is recording an event, any nested intercepted call
//! from the *same thread* must bypass recording, both to prevent infinite
//! recursion and so the monitor's own I/O is never attributed to the
//! program being observed. Acquiring and releasing the guard must also
//! save and restore any per-thread OS error-code register, so an
//! intercepted call looks transparent to its caller even though the
//! monitor made OS calls of its own in between.
//!
//! The OS error code itself is platform-specific (`GetLastError` on
//! Windows), so this type stays generic over it: `amon-interceptors`
//! supplies the save/restore closures, this crate only owns the "is a
//! fold already in progress on this thread" bookkeeping.

use crate::session_registry::{is_inside_monitor, set_inside_monitor};

/// RAII guard for one interceptor replacement body's monitor-side logic.
///
/// `ReentrancyGuard::enter` returns `None` when the calling thread is
/// already inside a replacement body; the caller must then skip straight
/// to the original trampoline instead of recording anything. On success
/// the guard holds whatever `save` captured and restores it via `restore`
/// on drop, regardless of what monitor-side OS calls happened in between.
pub struct ReentrancyGuard<'a, T> {
    restore: Option<Box<dyn FnOnce(T) + 'a>>,
    saved: Option<T>,
}

impl<'a, T> ReentrancyGuard<'a, T> {
    pub fn enter<S, R>(save: S, restore: R) -> Option<Self>
    where
        S: FnOnce() -> T,
        R: FnOnce(T) + 'a,
    {
        if is_inside_monitor() {
            return None;
        }
        set_inside_monitor(true);
        let saved = save();
        Some(Self { restore: Some(Box::new(restore)), saved: Some(saved) })
    }
}

impl<T> Drop for ReentrancyGuard<'_, T> {
    fn drop(&mut self) {
        if let (Some(restore), Some(saved)) = (self.restore.take(), self.saved.take()) {
            restore(saved);
        }
        set_inside_monitor(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn nested_call_on_same_thread_is_bypassed() {
        let outer = ReentrancyGuard::enter(|| 0u32, |_| {});
        assert!(outer.is_some());
        let inner = ReentrancyGuard::enter(|| 0u32, |_| {});
        assert!(inner.is_none(), "nested enter on the same thread must bypass recording");
        drop(outer);
        let after = ReentrancyGuard::enter(|| 0u32, |_| {});
        assert!(after.is_some(), "flag must clear once the outer guard drops");
    }

    #[test]
    fn saved_state_is_restored_on_drop() {
        let restored = Arc::new(Mutex::new(None));
        let restored_clone = restored.clone();
        {
            let _guard = ReentrancyGuard::enter(|| 1234u32, move |saved| *restored_clone.lock().unwrap() = Some(saved));
        }
        assert_eq!(*restored.lock().unwrap(), Some(1234));
    }
}
