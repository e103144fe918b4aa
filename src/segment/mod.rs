//! Named shared memory regions written by the rFactor 2 plugin
//!
//! The plugin publishes each region under a fixed object name; Telemetry,
//! Scoring and Extended are namespaced per producer instance with a name
//! suffix, while ForceFeedback is a single global channel. A segment is a
//! read-side mapping of one such region: the producer writes into it fully
//! asynchronously and will never honor a lock held here, so the only safe
//! way to consume it is to copy bytes out and verify them afterwards (see
//! the `snapshot` module).

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix::Mapping;
#[cfg(windows)]
use windows::Mapping;

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Logical kind of a mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    Telemetry,
    Scoring,
    Extended,
    ForceFeedback,
}

impl RegionKind {
    /// Object name under the plugin's naming convention.
    ///
    /// The suffix identifies one producer process instance (empty for the
    /// default instance). ForceFeedback ignores it: the plugin exposes a
    /// single global force feedback channel.
    pub fn object_name(&self, suffix: &str) -> String {
        match self {
            RegionKind::Telemetry => format!("$rFactor2SMMP_Telemetry${suffix}"),
            RegionKind::Scoring => format!("$rFactor2SMMP_Scoring${suffix}"),
            RegionKind::Extended => format!("$rFactor2SMMP_Extended${suffix}"),
            RegionKind::ForceFeedback => "$rFactor2SMMP_ForceFeedback$".to_string(),
        }
    }
}

/// One mapped shared memory region, exclusively owned by its opener.
///
/// Closing (or resetting) a segment invalidates every borrowed view taken
/// from it; snapshots are copies, so published data stays valid across both.
pub struct SharedSegment {
    name: String,
    size: usize,
    mapping: Option<Mapping>,
}

impl SharedSegment {
    /// Map the named region, creating and zero-filling it if the backing
    /// object does not exist yet (the producer may start after us).
    pub fn open(kind: RegionKind, size: usize, suffix: &str) -> Result<Self> {
        let name = kind.object_name(suffix);
        let mapping = Mapping::open(&name, size)?;
        trace!(name = %name, size, "mapped shared memory region");
        Ok(Self { name, size, mapping: Some(mapping) })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_open(&self) -> bool {
        self.mapping.is_some()
    }

    /// Borrowed view of the raw region bytes.
    ///
    /// The view aliases producer-written memory and must be copied before
    /// the segment is closed or reset; it carries no consistency guarantee
    /// of its own.
    pub fn read(&self) -> Result<&[u8]> {
        match &self.mapping {
            Some(mapping) => {
                // SAFETY: the mapping is valid for `size` bytes while it is
                // alive, and the borrow ties the slice to &self.
                Ok(unsafe { std::slice::from_raw_parts(mapping.as_ptr(), self.size) })
            }
            None => Err(SyncError::SegmentClosed { name: self.name.clone() }),
        }
    }

    /// Release the mapping. Safe to call more than once.
    pub fn close(&mut self) {
        if self.mapping.take().is_some() {
            debug!(name = %self.name, "closed shared memory region");
        }
    }

    /// Close and reopen with the same parameters.
    ///
    /// Used to recover a mapping suspected to be behind a restarted
    /// producer. Failure to reopen leaves the segment closed.
    pub fn reset(&mut self) -> Result<()> {
        self.close();
        self.mapping = Some(Mapping::open(&self.name, self.size)?);
        info!(name = %self.name, "remapped shared memory region");
        Ok(())
    }

    /// Test-only producer-side write into the mapped region.
    #[cfg(test)]
    pub(crate) fn write_bytes(&self, offset: usize, bytes: &[u8]) {
        let mapping = self.mapping.as_ref().expect("segment open");
        assert!(offset + bytes.len() <= self.size, "write past region end");
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                mapping.as_ptr().add(offset),
                bytes.len(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_names_follow_plugin_convention() {
        assert_eq!(RegionKind::Telemetry.object_name("4721"), "$rFactor2SMMP_Telemetry$4721");
        assert_eq!(RegionKind::Scoring.object_name(""), "$rFactor2SMMP_Scoring$");
        assert_eq!(RegionKind::Extended.object_name("x"), "$rFactor2SMMP_Extended$x");
        // the force feedback channel is global, never namespaced
        assert_eq!(RegionKind::ForceFeedback.object_name("4721"), "$rFactor2SMMP_ForceFeedback$");
    }

    #[cfg(unix)]
    mod mapped {
        use super::*;

        fn unique_suffix(tag: &str) -> String {
            format!("{tag}-{}", std::process::id())
        }

        #[test]
        fn open_creates_zero_filled_region() {
            let suffix = unique_suffix("seg-zero");
            let seg = SharedSegment::open(RegionKind::Scoring, 256, &suffix).unwrap();
            let bytes = seg.read().unwrap();
            assert_eq!(bytes.len(), 256);
            assert!(bytes.iter().all(|&b| b == 0));
        }

        #[test]
        fn two_mappings_share_the_region() {
            let suffix = unique_suffix("seg-share");
            let producer = SharedSegment::open(RegionKind::Telemetry, 64, &suffix).unwrap();
            let consumer = SharedSegment::open(RegionKind::Telemetry, 64, &suffix).unwrap();

            producer.write_bytes(8, &[0xAB, 0xCD]);
            let bytes = consumer.read().unwrap();
            assert_eq!(&bytes[8..10], &[0xAB, 0xCD]);
        }

        #[test]
        fn read_after_close_errors() {
            let suffix = unique_suffix("seg-close");
            let mut seg = SharedSegment::open(RegionKind::Extended, 32, &suffix).unwrap();
            seg.close();
            seg.close(); // idempotent
            assert!(matches!(seg.read(), Err(SyncError::SegmentClosed { .. })));
        }

        #[test]
        fn reset_reopens_the_same_region() {
            let suffix = unique_suffix("seg-reset");
            let writer = SharedSegment::open(RegionKind::Scoring, 64, &suffix).unwrap();
            let mut seg = SharedSegment::open(RegionKind::Scoring, 64, &suffix).unwrap();

            writer.write_bytes(0, &[7; 4]);
            seg.reset().unwrap();
            assert!(seg.is_open());
            assert_eq!(&seg.read().unwrap()[..4], &[7; 4]);
        }
    }
}
