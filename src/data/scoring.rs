//! Scoring page: session standings and the player flag

use super::{MAX_MAPPED_VEHICLES, MemoryPage, VersionStamped, fixed_str};
use crate::segment::RegionKind;

/// Session-wide scoring header.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ScoringInfo {
    pub session: i32,
    pub current_et: f64,
    pub end_et: f64,
    pub max_laps: i32,
    pub lap_dist: f64,
    pub num_vehicles: i32,
    pub game_phase: u8,
    pub yellow_flag_state: i8,
    pub ambient_temp: f64,
    pub track_temp: f64,
    pub dark_cloud: f64,
    pub raining: f64,
}

/// Per-vehicle scoring slot.
///
/// `is_player` is written as exactly 1 by the plugin for the local player's
/// vehicle; any other value (including uninitialized garbage left by a
/// half-written page) must not be treated as the player flag.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ScoringVehicle {
    pub id: i32,
    pub driver_name: [u8; 32],
    pub vehicle_name: [u8; 64],
    pub vehicle_class: [u8; 32],
    pub total_laps: i16,
    pub sector: i8,
    pub finish_status: i8,
    pub lap_dist: f64,
    pub best_lap_time: f64,
    pub last_lap_time: f64,
    pub cur_sector1: f64,
    pub cur_sector2: f64,
    pub time_behind_leader: f64,
    pub laps_behind_leader: i32,
    pub place: u8,
    pub is_player: u8,
    pub in_pits: u8,
    pub num_pitstops: i16,
    pub num_penalties: i16,
}

impl Default for ScoringVehicle {
    fn default() -> Self {
        // SAFETY: repr(C) plain data, valid all-zero.
        unsafe { std::mem::zeroed() }
    }
}

impl ScoringVehicle {
    /// Whether this slot is the local player (explicit flag value only).
    pub fn is_player(&self) -> bool {
        self.is_player == 1
    }

    pub fn driver_name(&self) -> String {
        fixed_str(&self.driver_name)
    }

    pub fn vehicle_name(&self) -> String {
        fixed_str(&self.vehicle_name)
    }
}

/// Full scoring region as written by the plugin.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ScoringPage {
    pub version_begin: u32,
    pub version_end: u32,
    pub bytes_updated_hint: i32,
    pub info: ScoringInfo,
    pub vehicles: [ScoringVehicle; MAX_MAPPED_VEHICLES],
}

unsafe impl MemoryPage for ScoringPage {
    const KIND: RegionKind = RegionKind::Scoring;
}

impl VersionStamped for ScoringPage {
    fn version_begin(&self) -> u32 {
        self.version_begin
    }

    fn version_end(&self) -> u32 {
        self.version_end
    }
}
