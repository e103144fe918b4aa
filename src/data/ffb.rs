//! Force feedback page: single global channel, no instance suffix

use super::{MemoryPage, VersionStamped};
use crate::segment::RegionKind;

/// Force feedback region: one value, updated at physics rate.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ForceFeedbackPage {
    pub version_begin: u32,
    pub version_end: u32,
    pub force_value: f64,
}

unsafe impl MemoryPage for ForceFeedbackPage {
    const KIND: RegionKind = RegionKind::ForceFeedback;
}

impl VersionStamped for ForceFeedbackPage {
    fn version_begin(&self) -> u32 {
        self.version_begin
    }

    fn version_end(&self) -> u32 {
        self.version_end
    }
}
