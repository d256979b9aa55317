// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A process-liveness probe over Win32, used by `amon-runtime`'s
//! [`ParticipantWaiter`](../../amon_runtime/trait.ParticipantWaiter.html)
//! to poll whether a session participant has exited (spec.md §5
//! "`stop_session` waits for all participant processes to exit"). Kept in
//! this crate (rather than `amon-runtime`) because the workspace forbids
//! `unsafe_code` everywhere except the two crates that already need Win32
//! FFI for injection itself.

#[cfg(windows)]
pub fn process_is_alive(pid: u32) -> bool {
    use windows_sys::Win32::Foundation::{CloseHandle, WAIT_TIMEOUT};
    use windows_sys::Win32::System::Threading::{OpenProcess, WaitForSingleObject, PROCESS_QUERY_LIMITED_INFORMATION};

    // SAFETY: `pid` is a plain value; the returned handle is checked for
    // null before use and closed on every path below.
    let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid) };
    if handle == 0 {
        return false;
    }
    // SAFETY: `handle` was just opened above and is closed immediately
    // after this call regardless of outcome.
    let status = unsafe { WaitForSingleObject(handle, 0) };
    unsafe { CloseHandle(handle) };
    status == WAIT_TIMEOUT
}
