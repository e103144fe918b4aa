//! Telemetry page: vehicle physics and driver input state

use super::{MAX_MAPPED_VEHICLES, MemoryPage, VersionStamped};
use crate::segment::RegionKind;

/// Three-component vector in the plugin's world/local frames.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Per-vehicle telemetry slot.
///
/// Slot position is not stable across producer restarts; `id` is the
/// producer-assigned vehicle identity and is stable for the session.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TelemetryVehicle {
    pub id: i32,
    pub delta_time: f64,
    pub elapsed_time: f64,
    pub lap_number: i32,
    pub lap_start_et: f64,

    pub pos: Vec3,
    pub local_vel: Vec3,
    pub local_accel: Vec3,

    pub gear: i32,
    pub engine_rpm: f64,
    pub engine_water_temp: f64,
    pub engine_oil_temp: f64,
    pub clutch_rpm: f64,

    pub unfiltered_throttle: f64,
    pub unfiltered_brake: f64,
    pub unfiltered_steering: f64,
    pub unfiltered_clutch: f64,

    pub filtered_throttle: f64,
    pub filtered_brake: f64,
    pub filtered_steering: f64,
    pub filtered_clutch: f64,

    pub steering_shaft_torque: f64,
    pub fuel: f64,
}

impl Default for TelemetryVehicle {
    fn default() -> Self {
        // SAFETY: repr(C) plain data, valid all-zero.
        unsafe { std::mem::zeroed() }
    }
}

impl TelemetryVehicle {
    /// Speed in m/s derived from the local-frame velocity.
    pub fn speed(&self) -> f64 {
        let v = &self.local_vel;
        (v.x * v.x + v.y * v.y + v.z * v.z).sqrt()
    }

    /// Zero the per-tick driver input fields.
    ///
    /// Applied once when the producer freezes, so a control captured
    /// mid-press (clutch held, wheel turned) does not read as held input
    /// for the whole stall.
    pub(crate) fn clear_input_artifacts(&mut self) {
        self.unfiltered_throttle = 0.0;
        self.unfiltered_brake = 0.0;
        self.unfiltered_steering = 0.0;
        self.unfiltered_clutch = 0.0;
        self.filtered_throttle = 0.0;
        self.filtered_brake = 0.0;
        self.filtered_steering = 0.0;
        self.filtered_clutch = 0.0;
        self.steering_shaft_torque = 0.0;
    }
}

/// Full telemetry region as written by the plugin.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct TelemetryPage {
    pub version_begin: u32,
    pub version_end: u32,
    pub bytes_updated_hint: i32,
    pub num_vehicles: i32,
    pub vehicles: [TelemetryVehicle; MAX_MAPPED_VEHICLES],
}

unsafe impl MemoryPage for TelemetryPage {
    const KIND: RegionKind = RegionKind::Telemetry;
}

impl VersionStamped for TelemetryPage {
    fn version_begin(&self) -> u32 {
        self.version_begin
    }

    fn version_end(&self) -> u32 {
        self.version_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_is_velocity_magnitude() {
        let mut slot = TelemetryPage::zeroed().vehicles[0];
        slot.local_vel = Vec3 { x: 3.0, y: 0.0, z: 4.0 };
        assert!((slot.speed() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn input_artifact_reset_only_touches_inputs() {
        let mut slot = TelemetryPage::zeroed().vehicles[0];
        slot.gear = 4;
        slot.engine_rpm = 7200.0;
        slot.unfiltered_clutch = 1.0;
        slot.filtered_steering = -0.4;
        slot.steering_shaft_torque = 11.5;

        slot.clear_input_artifacts();

        assert_eq!(slot.unfiltered_clutch, 0.0);
        assert_eq!(slot.filtered_steering, 0.0);
        assert_eq!(slot.steering_shaft_torque, 0.0);
        assert_eq!(slot.gear, 4);
        assert_eq!(slot.engine_rpm, 7200.0);
    }
}
