//! Error types for shared memory synchronization.
//!
//! All errors implement `std::error::Error` and carry structured context.
//! Transient conditions of the sync loop (torn reads, unresolved player
//! index, producer freeze) are deliberately *not* errors: they are part of
//! normal operation against an unreliable producer and are reported through
//! the synchronized-status flag instead.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for sync operations.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

/// Main error type for shared memory sync operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SyncError {
    #[error("shared memory region '{name}' unavailable")]
    SegmentUnavailable {
        name: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("access to shared memory region '{name}' denied")]
    PermissionDenied {
        name: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("region '{name}' is {actual} bytes, page layout needs {expected}")]
    RegionTooSmall { name: String, expected: usize, actual: usize },

    #[error("segment '{name}' used after close")]
    SegmentClosed { name: String },

    #[error("sync loop did not stop within {timeout:?}")]
    StopTimeout { timeout: Duration },

    #[cfg(windows)]
    #[error("Windows API error: {operation}")]
    WindowsApi {
        operation: String,
        #[source]
        source: windows_core::Error,
    },
}

impl SyncError {
    /// Whether retrying the failed operation could plausibly succeed.
    ///
    /// Open failures are retryable because the producer may simply not have
    /// created the region yet; size and lifecycle errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::SegmentUnavailable { .. } => true,
            SyncError::PermissionDenied { .. } => false,
            SyncError::RegionTooSmall { .. } => false,
            SyncError::SegmentClosed { .. } => false,
            SyncError::StopTimeout { .. } => true,
            #[cfg(windows)]
            SyncError::WindowsApi { .. } => true,
        }
    }

    /// Helper constructor for unavailable-region errors.
    pub fn segment_unavailable(
        name: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SyncError::SegmentUnavailable { name: name.into(), source: Some(Box::new(source)) }
    }

    /// Helper constructor for permission errors.
    pub fn permission_denied(
        name: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SyncError::PermissionDenied { name: name.into(), source: Some(Box::new(source)) }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api(operation: impl Into<String>, source: windows_core::Error) -> Self {
        SyncError::WindowsApi { operation: operation.into(), source }
    }
}
