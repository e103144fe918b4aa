//! Consistent-snapshot reads from producer-written regions
//!
//! The producer is another process and honors no lock this side could
//! take, so the only consistency mechanism is copy-then-verify: copy the
//! whole region into an owned page, then require the bracketing version
//! stamps to match. A mismatched pair means the copy straddled a producer
//! write; the caller discards the page and retries on its next tick.

use crate::data::{MemoryPage, VersionStamped};
use crate::error::{Result, SyncError};
use crate::segment::SharedSegment;
use std::mem::MaybeUninit;
use tracing::trace;

/// Copy the segment's bytes into an owned page, without verification.
///
/// Used for regions whose staleness is acceptable (extended metadata,
/// force feedback); everything slot-indexed goes through [`read_verified`].
pub fn read_page<T: MemoryPage>(segment: &SharedSegment) -> Result<T> {
    let bytes = segment.read()?;
    copy_page(bytes, segment.name())
}

/// Copy the segment's bytes and check the version stamp pair.
///
/// `Ok(None)` signals a torn read: the producer was mid-write while we
/// copied. It is transient by definition and never surfaced to consumers;
/// callers simply keep the previous state and retry next tick.
pub fn read_verified<T: MemoryPage + VersionStamped>(segment: &SharedSegment) -> Result<Option<T>> {
    let page: T = read_page(segment)?;
    if page.is_consistent() {
        Ok(Some(page))
    } else {
        trace!(
            name = %segment.name(),
            begin = page.version_begin(),
            end = page.version_end(),
            "torn read discarded"
        );
        Ok(None)
    }
}

fn copy_page<T: MemoryPage>(bytes: &[u8], name: &str) -> Result<T> {
    let expected = std::mem::size_of::<T>();
    if bytes.len() < expected {
        return Err(SyncError::RegionTooSmall {
            name: name.to_string(),
            expected,
            actual: bytes.len(),
        });
    }

    let mut page = MaybeUninit::<T>::uninit();
    // SAFETY: source holds at least size_of::<T>() bytes, destination is a
    // properly aligned T, and MemoryPage types are valid for any bit pattern.
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), page.as_mut_ptr() as *mut u8, expected);
        Ok(page.assume_init())
    }
}

/// Raw bytes of a page, for producer-side test writes.
#[cfg(test)]
pub(crate) fn page_bytes<T: MemoryPage>(page: &T) -> &[u8] {
    // SAFETY: T is repr(C) plain data; reading its bytes is always valid.
    unsafe {
        std::slice::from_raw_parts(page as *const T as *const u8, std::mem::size_of::<T>())
    }
}
