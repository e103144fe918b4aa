//! Extended page: plugin/session metadata

use super::{MemoryPage, VersionStamped, fixed_str};
use crate::segment::RegionKind;

/// Extended region: plugin version and coarse session lifecycle flags.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExtendedPage {
    pub version_begin: u32,
    pub version_end: u32,
    pub version: [u8; 12],
    pub is_64bit: u8,
    pub session_started: u8,
    pub ticks_session_started: i64,
    pub ticks_session_ended: i64,
    pub in_realtime: u8,
}

impl ExtendedPage {
    /// Plugin version string, e.g. "3.7.14.2".
    pub fn version_string(&self) -> String {
        fixed_str(&self.version)
    }
}

unsafe impl MemoryPage for ExtendedPage {
    const KIND: RegionKind = RegionKind::Extended;
}

impl VersionStamped for ExtendedPage {
    fn version_begin(&self) -> u32 {
        self.version_begin
    }

    fn version_end(&self) -> u32 {
        self.version_end
    }
}
