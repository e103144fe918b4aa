//! Player-synced access to rFactor 2 shared memory telemetry.
//!
//! The rFactor 2 shared memory plugin publishes telemetry, scoring,
//! extended and force feedback data into named memory regions, written by
//! the simulation process without any reader coordination. This crate keeps
//! a continuously-refreshed, internally-consistent view of the *local
//! player's* vehicle on top of those regions:
//!
//! - **Torn-read rejection**: every region is copied wholesale and accepted
//!   only when its bracketing version stamps match
//! - **Player relocation**: the player's slot is re-derived every tick
//!   across the independently-updated scoring and telemetry feeds, with
//!   cross-feed vehicle id agreement
//! - **Freeze detection**: a two-state machine widens the poll cadence when
//!   the producer stalls and recovers (optionally remapping the regions)
//!   when it resumes
//! - **Lock-free publication**: consumers read a watch-published view that
//!   is replaced atomically, never mutated in place
//!
//! # Quick start
//!
//! ```rust,no_run
//! use rf2sync::{PlayerSync, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> rf2sync::Result<()> {
//!     let mut sync = PlayerSync::connect(SyncConfig::default())?;
//!     sync.start();
//!
//!     if sync.is_synced() {
//!         let telemetry = sync.player_telemetry();
//!         println!("gear {} at {:.1} m/s", telemetry.gear, telemetry.speed());
//!     }
//!
//!     sync.stop().await;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod state;
mod sync;
#[cfg(test)]
mod test_utils;
mod view;

pub mod data;
pub mod locator;
pub mod segment;
pub mod snapshot;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use locator::PlayerIndex;
pub use state::PollMode;
pub use sync::PlayerSync;
pub use view::PlayerView;

pub use data::{
    ExtendedPage, ForceFeedbackPage, MAX_MAPPED_VEHICLES, MemoryPage, ScoringInfo, ScoringPage,
    ScoringVehicle, TelemetryPage, TelemetryVehicle, VersionStamped,
};
pub use segment::{RegionKind, SharedSegment};
