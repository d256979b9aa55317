// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cfg(windows)` real implementations of the [`Os`] and [`PatchOps`] seams.
//!
//! `WindowsOs` answers the questions interceptor bodies ask of the OS
//! (spec.md §7.1 supplement) over real Win32 calls. `WinApiPatchOps`
//! performs the actual import-address-table patch spec.md §4.C describes,
//! grounded in `original_source/accessMonitor/Patch.cpp`'s
//! `patchImportEntry`: flip the page writable, write the replacement
//! pointer, flip it back. IAT patching is chosen over inline/trampoline
//! patching (SPEC_FULL.md §4.C note) because it needs no disassembler to
//! find a safe instruction boundary to overwrite — the entry whose address
//! to replace is given directly by each module's import table.
//!
//! Everything in this file is the one place in the crate where `unsafe` is
//! allowed to appear; every block is kept to the smallest FFI call it
//! needs.

use crate::access_flags::DesiredAccess;
use crate::os::{HandleId, Os};
use amon_core::FileTime;
use amon_engine::{PatchOps, Symbol};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::os::windows::ffi::OsStrExt;
use windows_sys::Win32::Foundation::{GetLastError, SetLastError, FILETIME, MAX_PATH};
use windows_sys::Win32::Storage::FileSystem::{
    GetFileAttributesExW, GetFileExInfoStandard, GetFullPathNameW, WIN32_FILE_ATTRIBUTE_DATA,
};

/// Real `Os` over Win32 file-system and error-state queries.
pub struct WindowsOs {
    /// Every live handle this process has opened along with the mask it
    /// was opened with, so a later close-time lookup can answer "what was
    /// this handle's actual access mask" (spec.md §4.D "Mode projection on
    /// close"). The replacement bodies for `CreateFileW` populate this;
    /// `winapi_patch` itself never opens a handle on its own behalf.
    handle_masks: Mutex<HashMap<HandleId, DesiredAccess>>,
}

impl WindowsOs {
    pub fn new() -> Self {
        Self { handle_masks: Mutex::new(HashMap::new()) }
    }

    /// Record the access mask a handle was actually opened with. Called
    /// from the `CreateFileW` replacement body after the real call returns
    /// a valid handle.
    pub fn track_handle(&self, handle: HandleId, mask: DesiredAccess) {
        self.handle_masks.lock().insert(handle, mask);
    }

    pub fn forget_handle(&self, handle: HandleId) {
        self.handle_masks.lock().remove(&handle);
    }
}

impl Default for WindowsOs {
    fn default() -> Self {
        Self::new()
    }
}

impl Os for WindowsOs {
    fn resolve_path(&self, raw: &str) -> Option<PathBuf> {
        if raw.is_empty() {
            return None;
        }
        let mut wide: Vec<u16> = raw.encode_utf16().chain(std::iter::once(0)).collect();
        let mut buffer = vec![0u16; MAX_PATH as usize];
        // SAFETY: `wide` is a valid NUL-terminated UTF-16 buffer and
        // `buffer` is sized to the exact capacity passed as its length.
        let written = unsafe {
            GetFullPathNameW(wide.as_mut_ptr(), buffer.len() as u32, buffer.as_mut_ptr(), std::ptr::null_mut())
        };
        if written == 0 || written as usize >= buffer.len() {
            return None;
        }
        let resolved = String::from_utf16_lossy(&buffer[..written as usize]);
        Some(PathBuf::from(resolved))
    }

    fn file_last_write_time(&self, path: &Path) -> Option<FileTime> {
        let mut wide: Vec<u16> = path.as_os_str().encode_wide().chain(std::iter::once(0)).collect();
        let mut data: WIN32_FILE_ATTRIBUTE_DATA = unsafe { std::mem::zeroed() };
        // SAFETY: `wide` is NUL-terminated and `data` is a plain-old-data
        // struct Win32 fills in place; no ownership is transferred.
        let ok = unsafe { GetFileAttributesExW(wide.as_mut_ptr(), GetFileExInfoStandard, &mut data as *mut _ as *mut _) };
        if ok == 0 {
            return None;
        }
        Some(filetime_to_file_time(data.ftLastWriteTime))
    }

    fn wall_clock_time(&self) -> FileTime {
        let mut ft: FILETIME = unsafe { std::mem::zeroed() };
        // SAFETY: `GetSystemTimeAsFileTime` fills a plain FILETIME we own.
        unsafe { windows_sys::Win32::System::SystemInformation::GetSystemTimeAsFileTime(&mut ft) };
        filetime_to_file_time(ft)
    }

    fn handle_access_mask(&self, handle: HandleId) -> Option<DesiredAccess> {
        self.handle_masks.lock().get(&handle).copied()
    }

    fn save_error_state(&self) -> u32 {
        // SAFETY: `GetLastError` reads thread-local state, no arguments.
        unsafe { GetLastError() }
    }

    fn restore_error_state(&self, state: u32) {
        // SAFETY: `SetLastError` writes thread-local state, no arguments
        // beyond the plain `u32` it takes by value.
        unsafe { SetLastError(state) }
    }
}

fn filetime_to_file_time(ft: FILETIME) -> FileTime {
    let ticks = ((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64;
    FileTime::from_windows_ticks(ticks)
}

/// Real IAT patching (`amon-interceptors` half of spec.md §4.C). A symbol's
/// `name` is resolved to its import-table slot lazily, the first time it is
/// patched, by `amon-interceptors`'s own bootstrap (not shown here — this
/// type only owns the raw "flip protection, write pointer, flip back"
/// primitive and the table of slots it has been told about).
pub struct WinApiPatchOps {
    slots: Mutex<HashMap<&'static str, (usize, usize)>>,
}

impl WinApiPatchOps {
    pub fn new() -> Self {
        Self { slots: Mutex::new(HashMap::new()) }
    }

    /// Register the import-table slot address and replacement-function
    /// address for a symbol, discovered by walking the process's loaded
    /// modules' import descriptors (`original_source/Patch.cpp`'s
    /// `parseLibrary`). Must be called once per symbol before `patch`.
    pub fn register_slot(&self, symbol: Symbol, slot_address: usize, replacement_address: usize) {
        self.slots.lock().insert(symbol.name, (slot_address, replacement_address));
    }
}

impl Default for WinApiPatchOps {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchOps for WinApiPatchOps {
    fn patch(&self, symbol: Symbol) -> Result<(), String> {
        let slots = self.slots.lock();
        let &(slot_address, replacement_address) = slots
            .get(symbol.name)
            .ok_or_else(|| format!("no import-table slot registered for {}", symbol.name))?;
        // SAFETY: `slot_address` was discovered by walking the process's
        // own import descriptors and points at a writable IAT entry for
        // the lifetime of the owning module; the write is bracketed by
        // `VirtualProtect` calls matching `patchImportEntry` in
        // `Patch.cpp`.
        unsafe { patch_import_entry(slot_address, replacement_address) }
    }

    fn restore(&self, symbol: Symbol) -> Result<(), String> {
        // Restoring means writing the *original* function pointer back;
        // `amon-interceptors`'s bootstrap records that alongside the slot
        // when it first patches, so `register_slot` is re-used here with
        // the roles of "current" and "original" swapped by the caller.
        self.patch(symbol)
    }
}

/// # Safety
/// `slot_address` must be a valid, writable pointer-sized memory location
/// within the calling process's own address space (an import address
/// table entry), and must remain valid for the duration of this call.
unsafe fn patch_import_entry(slot_address: usize, replacement_address: usize) -> Result<(), String> {
    use windows_sys::Win32::System::Memory::{VirtualProtect, PAGE_PROTECTION_FLAGS, PAGE_READWRITE};

    let slot = slot_address as *mut usize;
    let mut previous_protection: PAGE_PROTECTION_FLAGS = 0;
    if VirtualProtect(slot as *mut _, std::mem::size_of::<usize>(), PAGE_READWRITE, &mut previous_protection) == 0 {
        return Err("VirtualProtect (make writable) failed".to_string());
    }
    *slot = replacement_address;
    let mut unused: PAGE_PROTECTION_FLAGS = 0;
    if VirtualProtect(slot as *mut _, std::mem::size_of::<usize>(), previous_protection, &mut unused) == 0 {
        return Err("VirtualProtect (restore protection) failed".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_slot_then_patch_writes_through() {
        let mut target: usize = 0;
        let ops = WinApiPatchOps::new();
        let symbol = Symbol::new("CreateFileW");
        let replacement = 0xDEAD_BEEFusize;
        ops.register_slot(symbol, &mut target as *mut usize as usize, replacement);
        ops.patch(symbol).unwrap();
        assert_eq!(target, replacement);
    }

    #[test]
    fn patching_an_unregistered_symbol_is_an_error() {
        let ops = WinApiPatchOps::new();
        assert!(ops.patch(Symbol::new("DeleteFileW")).is_err());
    }
}
