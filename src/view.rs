//! The player-synced view published to consumers

use crate::data::{ExtendedPage, MemoryPage, ScoringVehicle, TelemetryVehicle};

/// Last committed, verified, player-scoped state.
///
/// Published wholesale through a watch channel by the sync loop; consumers
/// only ever see a previous fully-verified value or a new fully-verified
/// value, never a partial update. The scoring and telemetry slots in one
/// view were captured in the same polling tick and cross-checked to carry
/// the same vehicle id.
#[derive(Debug, Clone, Copy)]
pub struct PlayerView {
    /// Player's scoring slot from the last committed tick.
    pub scoring: ScoringVehicle,
    /// Player's telemetry slot from the same tick.
    pub telemetry: TelemetryVehicle,
    /// Extended session metadata (copied unverified each tick).
    pub extended: ExtendedPage,
    /// Current force feedback value from the global channel.
    pub ffb_force: f64,
    /// Whether the player slot resolved on the most recent attempt.
    ///
    /// False means the slot payloads above are the last good values, held
    /// rather than cleared, and should not be treated as current.
    pub synced: bool,
}

impl Default for PlayerView {
    fn default() -> Self {
        Self {
            scoring: ScoringVehicle::default(),
            telemetry: TelemetryVehicle::default(),
            extended: ExtendedPage::zeroed(),
            ffb_force: 0.0,
            synced: false,
        }
    }
}
