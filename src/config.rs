//! Sync loop configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for the background sync loop.
///
/// The defaults match the plugin's update cadence: ~100Hz polling while the
/// producer is live, a much wider interval once it has frozen, and a one
/// second window before a static version stamp counts as a freeze.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Per-instance name suffix for the Telemetry/Scoring/Extended regions
    /// (the producer process identifier; empty for the default instance).
    pub instance_suffix: String,

    /// Poll interval while the producer is advancing its version stamp.
    pub active_poll: Duration,

    /// Poll interval while frozen, waiting for the producer to resume.
    pub frozen_poll: Duration,

    /// How long the scoring version stamp may stay unchanged before the
    /// loop declares a freeze.
    pub freeze_window: Duration,

    /// Number of additional full freeze windows with an identical stamp
    /// before the shared memory mappings are reset. Experimental: assumes
    /// the mapping itself can fall behind a restarted producer. 0 disables.
    pub remap_after_windows: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            instance_suffix: String::new(),
            active_poll: Duration::from_millis(10),
            frozen_poll: Duration::from_millis(250),
            freeze_window: Duration::from_secs(1),
            remap_after_windows: 2,
        }
    }
}

impl SyncConfig {
    /// Config for a producer instance namespaced by process id.
    pub fn for_instance(suffix: impl Into<String>) -> Self {
        Self { instance_suffix: suffix.into(), ..Self::default() }
    }
}
