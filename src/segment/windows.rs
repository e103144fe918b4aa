//! Windows named file mapping backend
//!
//! Matches the plugin's own access pattern: a page-file-backed mapping
//! under the `$rFactor2SMMP_*$` tag name. `CreateFileMappingW` opens the
//! producer's mapping when it exists and otherwise creates a zero-filled
//! one of the requested size, so the consumer can start first.

use crate::error::{Result, SyncError};
use std::ptr::NonNull;
use windows::Win32::Foundation::{CloseHandle, ERROR_ACCESS_DENIED, HANDLE, INVALID_HANDLE_VALUE};
use windows::Win32::System::Memory::{
    CreateFileMappingW, FILE_MAP_READ, FILE_MAP_WRITE, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
    PAGE_READWRITE, UnmapViewOfFile,
};
use windows::core::PCWSTR;

pub(super) struct Mapping {
    handle: HANDLE,
    base: NonNull<u8>,
}

// SAFETY: the handle and view are kernel objects safe to move between
// threads; consistency of the pointed-to bytes is the snapshot layer's job.
unsafe impl Send for Mapping {}

impl Mapping {
    pub(super) fn open(name: &str, size: usize) -> Result<Self> {
        let wide_name = wide_string(name);

        let handle = unsafe {
            CreateFileMappingW(
                INVALID_HANDLE_VALUE,
                None,
                PAGE_READWRITE,
                0,
                size as u32,
                PCWSTR::from_raw(wide_name.as_ptr()),
            )
        }
        .map_err(|e| open_error(name, e))?;

        let base = unsafe {
            let view = MapViewOfFile(handle, FILE_MAP_READ | FILE_MAP_WRITE, 0, 0, size);
            match NonNull::new(view.Value as *mut u8) {
                Some(ptr) => ptr,
                None => {
                    let win_err = windows::core::Error::from_thread();
                    let _ = CloseHandle(handle);
                    return Err(SyncError::windows_api("MapViewOfFile", win_err));
                }
            }
        };

        Ok(Self { handle, base })
    }

    pub(super) fn as_ptr(&self) -> *mut u8 {
        self.base.as_ptr()
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
            let _ = CloseHandle(self.handle);
        }
    }
}

fn open_error(name: &str, err: windows::core::Error) -> SyncError {
    if err.code() == ERROR_ACCESS_DENIED.to_hresult() {
        SyncError::PermissionDenied { name: name.to_string(), source: Some(Box::new(err)) }
    } else {
        SyncError::SegmentUnavailable { name: name.to_string(), source: Some(Box::new(err)) }
    }
}

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}
