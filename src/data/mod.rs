//! rFactor 2 shared memory page layouts
//!
//! These structs mirror the fixed binary layout written by the rFactor 2
//! shared memory plugin. The layout is owned by the producer; this crate
//! only copies pages out of the mapped regions and reads fields from the
//! copies. All pages are `repr(C)`, `Copy`, and valid for any bit pattern,
//! including all-zeroes (the state of a freshly created region before the
//! producer has written anything).

mod extended;
mod ffb;
mod scoring;
mod telemetry;

pub use extended::ExtendedPage;
pub use ffb::ForceFeedbackPage;
pub use scoring::{ScoringInfo, ScoringPage, ScoringVehicle};
pub use telemetry::{TelemetryPage, TelemetryVehicle, Vec3};

use crate::segment::RegionKind;

/// Maximum number of vehicle slots carried by the plugin's arrays.
pub const MAX_MAPPED_VEHICLES: usize = 128;

/// Marker for page types that may be copied verbatim out of shared memory.
///
/// # Safety
///
/// Implementors must be `repr(C)` with no padding-sensitive invariants and
/// must be valid for any bit pattern the producer (or a zero-filled fresh
/// region) can leave in the mapping.
pub unsafe trait MemoryPage: Copy + Sized + 'static {
    /// Which named region this page is read from.
    const KIND: RegionKind;

    /// All-zero page, the producer-absent default.
    fn zeroed() -> Self {
        // SAFETY: MemoryPage implementors are valid for the all-zero pattern.
        unsafe { std::mem::zeroed() }
    }
}

/// Access to the version stamp pair bracketing a producer write.
///
/// The producer increments `version_begin` before writing a page and
/// `version_end` after. Equality of the pair is the only consistency
/// signal available to an unsynchronized reader.
pub trait VersionStamped {
    fn version_begin(&self) -> u32;
    fn version_end(&self) -> u32;

    /// Whether a copied page was taken outside any producer write.
    fn is_consistent(&self) -> bool {
        self.version_begin() == self.version_end()
    }
}

/// Decode a fixed-size, NUL-padded byte field as UTF-8 text.
pub(crate) fn fixed_str(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim_end().to_string()
}
