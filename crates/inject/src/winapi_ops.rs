// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real `RemoteProcessOps` over Win32, modeled line-for-line on
//! `original_source/accessMonitor/Inject.cpp`'s `inject()`: `OpenProcess`
//! with the minimal rights the loader needs, `VirtualAllocEx` +
//! `WriteProcessMemory` to stage the library path, `CreateRemoteThread`
//! targeting `LoadLibraryA` in `kernel32.dll`, then a named-event wait for
//! the handshake the injected library signals on load.

use crate::ops::{RemoteAddress, RemoteProcessHandle, RemoteProcessOps, RemoteThreadHandle};
use amon_core::{HandshakeToken, SessionId};
use std::time::Duration;
use windows_sys::Win32::Foundation::CloseHandle;
use windows_sys::Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress};
use windows_sys::Win32::System::Memory::{VirtualAllocEx, MEM_COMMIT, PAGE_READWRITE};
use windows_sys::Win32::System::Threading::{
    CreateEventW, CreateRemoteThread, OpenProcess, ResumeThread, WaitForSingleObject,
    WriteProcessMemory, INFINITE, PROCESS_CREATE_THREAD, PROCESS_VM_OPERATION, PROCESS_VM_WRITE,
};

static HANDSHAKE_SEQUENCE: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);

fn next_handshake_sequence() -> u32 {
    HANDSHAKE_SEQUENCE.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
}

pub struct WinApiRemoteProcessOps;

impl WinApiRemoteProcessOps {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WinApiRemoteProcessOps {
    fn default() -> Self {
        Self::new()
    }
}

fn widen(s: &str) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;
    std::ffi::OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

impl RemoteProcessOps for WinApiRemoteProcessOps {
    fn open_process(&self, pid: u32) -> Result<RemoteProcessHandle, String> {
        // SAFETY: `pid` is a plain value; the returned handle is either
        // null (checked below) or a process handle we own until closed.
        let handle = unsafe { OpenProcess(PROCESS_CREATE_THREAD | PROCESS_VM_OPERATION | PROCESS_VM_WRITE, 0, pid) };
        if handle == 0 {
            return Err("OpenProcess returned a null handle".to_string());
        }
        Ok(handle as usize)
    }

    fn allocate(&self, process: RemoteProcessHandle, library_path_len: usize) -> Result<RemoteAddress, String> {
        // SAFETY: `process` is a handle this process opened and still
        // owns; the returned address is validated against null below.
        let address = unsafe {
            VirtualAllocEx(process as _, std::ptr::null(), library_path_len, MEM_COMMIT, PAGE_READWRITE)
        };
        if address.is_null() {
            return Err("VirtualAllocEx returned null".to_string());
        }
        Ok(address as usize)
    }

    fn write_library_path(&self, process: RemoteProcessHandle, address: RemoteAddress, library_path: &str) -> Result<(), String> {
        let bytes: Vec<u8> = library_path.bytes().chain(std::iter::once(0)).collect();
        let mut written = 0usize;
        // SAFETY: `address` was just allocated in `process` with capacity
        // for at least `bytes.len()` bytes by `allocate`.
        let ok = unsafe {
            WriteProcessMemory(process as _, address as *const _, bytes.as_ptr() as *const _, bytes.len(), &mut written)
        };
        if ok == 0 || written != bytes.len() {
            return Err("WriteProcessMemory did not write the full path".to_string());
        }
        Ok(())
    }

    fn create_remote_thread(&self, process: RemoteProcessHandle, library_path_address: RemoteAddress) -> Result<RemoteThreadHandle, String> {
        // SAFETY: `"Kernel32"` names a module every process has mapped;
        // `GetProcAddress` returns a valid function pointer or null.
        let kernel32 = unsafe { GetModuleHandleW(widen("Kernel32").as_ptr()) };
        if kernel32 == 0 {
            return Err("failed to resolve the Kernel32 module".to_string());
        }
        let load_library = unsafe { GetProcAddress(kernel32, c"LoadLibraryA".as_ptr() as *const u8) };
        let Some(load_library) = load_library else {
            return Err("failed to resolve LoadLibraryA".to_string());
        };
        const CREATE_SUSPENDED: u32 = 0x0000_0004;
        // SAFETY: `process` is a live handle with `PROCESS_CREATE_THREAD`
        // rights; `load_library` is a valid `LoadLibraryA` entry point;
        // `library_path_address` was written by `write_library_path`.
        let thread = unsafe {
            CreateRemoteThread(
                process as _,
                std::ptr::null(),
                0,
                Some(std::mem::transmute::<
                    usize,
                    unsafe extern "system" fn(*mut core::ffi::c_void) -> u32,
                >(load_library as usize)),
                library_path_address as *const _,
                CREATE_SUSPENDED,
                std::ptr::null_mut(),
            )
        };
        if thread == 0 {
            return Err("CreateRemoteThread returned a null handle".to_string());
        }
        Ok(thread as usize)
    }

    fn resume_thread(&self, thread: RemoteThreadHandle) -> Result<(), String> {
        // SAFETY: `thread` is a handle this call owns until closed.
        let previous_count = unsafe { ResumeThread(thread as _) };
        if previous_count == u32::MAX {
            return Err("ResumeThread failed".to_string());
        }
        Ok(())
    }

    fn wait_for_monitoring_active(&self, pid: u32, session: SessionId, timeout: Duration) -> Result<(), String> {
        let token = HandshakeToken::new(session, pid, next_handshake_sequence());
        let name = widen(&token.object_name());
        // SAFETY: `name` is a NUL-terminated wide string; the event is
        // created (or opened, if the child raced ahead and created it
        // first) manual-reset, initially unsignaled.
        let event = unsafe { CreateEventW(std::ptr::null(), 1, 0, name.as_ptr()) };
        if event == 0 {
            return Err("failed to create the monitoring_active handshake event".to_string());
        }
        let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(INFINITE);
        // SAFETY: `event` is a valid handle created above and closed
        // immediately after this call regardless of outcome.
        let result = unsafe { WaitForSingleObject(event, timeout_ms) };
        unsafe { CloseHandle(event) };
        const WAIT_OBJECT_0: u32 = 0;
        if result != WAIT_OBJECT_0 {
            return Err("timed out waiting for monitoring_active".to_string());
        }
        Ok(())
    }

    fn close_thread_handle(&self, thread: RemoteThreadHandle) {
        // SAFETY: `thread` was returned by `create_remote_thread` and not
        // previously closed.
        unsafe { CloseHandle(thread as _) };
    }

    fn close_process_handle(&self, process: RemoteProcessHandle) {
        // SAFETY: `process` was returned by `open_process` and not
        // previously closed.
        unsafe { CloseHandle(process as _) };
    }
}
