//! POSIX shared memory backend
//!
//! The plugin's Linux port exposes its regions as `/dev/shm` objects under
//! the same `$rFactor2SMMP_*$` names. Objects are never unlinked here: the
//! producer owns their lifetime, this side only maps and unmaps.

use crate::error::{Result, SyncError};
use rustix::fs::{fstat, ftruncate};
use rustix::io::Errno;
use rustix::mm::{MapFlags, ProtFlags, mmap, munmap};
use rustix::shm::{Mode, ShmOFlags, shm_open};
use std::ffi::CString;
use std::ptr::NonNull;

pub(super) struct Mapping {
    addr: NonNull<u8>,
    size: usize,
}

// SAFETY: the mapping is a raw region pointer; moving it between threads is
// fine, all consistency concerns are handled at the snapshot layer.
unsafe impl Send for Mapping {}

impl Mapping {
    pub(super) fn open(name: &str, size: usize) -> Result<Self> {
        // shm object names carry a single leading slash
        let c_name = CString::new(format!("/{name}"))
            .map_err(|e| SyncError::segment_unavailable(name, e))?;

        let fd = match shm_open(c_name.as_c_str(), ShmOFlags::RDWR, Mode::empty()) {
            Ok(fd) => fd,
            Err(e) if e == Errno::NOENT => {
                // Producer has not started yet: create the object ourselves
                // so mapping succeeds; ftruncate zero-fills it.
                let fd = shm_open(
                    c_name.as_c_str(),
                    ShmOFlags::CREATE | ShmOFlags::RDWR,
                    Mode::RUSR | Mode::WUSR | Mode::RGRP | Mode::ROTH,
                )
                .map_err(|e| open_error(name, e))?;
                ftruncate(&fd, size as u64).map_err(|e| open_error(name, e))?;
                fd
            }
            Err(e) => return Err(open_error(name, e)),
        };

        // A racing creator may have left the object shorter than our layout.
        let len = fstat(&fd).map_err(|e| open_error(name, e))?.st_size as usize;
        if len < size {
            ftruncate(&fd, size as u64).map_err(|e| open_error(name, e))?;
        }

        let addr = unsafe {
            mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                &fd,
                0,
            )
            .map_err(|e| open_error(name, e))?
        };
        let addr = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| SyncError::SegmentUnavailable { name: name.to_string(), source: None })?;

        // fd closes here; the mapping stays valid without it
        Ok(Self { addr, size })
    }

    pub(super) fn as_ptr(&self) -> *mut u8 {
        self.addr.as_ptr()
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        unsafe {
            let _ = munmap(self.addr.as_ptr().cast(), self.size);
        }
    }
}

fn open_error(name: &str, errno: Errno) -> SyncError {
    let err = std::io::Error::from(errno);
    if errno == Errno::ACCESS {
        SyncError::permission_denied(name, err)
    } else {
        SyncError::segment_unavailable(name, err)
    }
}
