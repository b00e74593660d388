use super::sim_var::SimVar;
use chrono::{DateTime, Utc};
use strum::IntoEnumIterator;
use strum_macros::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    /// The payload does not carry exactly one value per subscribed variable.
    WrongWidth { expected: usize, actual: usize },
}

impl std::error::Error for SnapshotError {}

/// The latest complete telemetry reading of the user aircraft.
///
/// A snapshot is always replaced as a whole, never patched field by field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySnapshot {
    pub yoke_x: f64,
    pub yoke_y: f64,
    pub elevator_trim_pct: f64,
    pub aileron_trim_pct: f64,
    pub rudder_trim_pct: f64,
    pub flaps_handle_index: u8,
    pub flaps_handle_positions: u8,
    pub flaps_left_pct: f64,
    pub flaps_right_pct: f64,
    pub throttle_lever_pct: f64,
    pub indicated_airspeed_kt: f64,
    pub true_airspeed_kt: f64,
    pub design_cruise_speed_kt: f64,
    pub design_takeoff_speed_kt: f64,
    /// Body rotation velocities (x: pitch, y: yaw, z: roll) in rad/s.
    pub rotation_velocity: [f64; 3],
    pub g_force: f64,
    pub prop_rpm: f64,
    pub engine_count: u8,
    pub gear_down: bool,
    pub on_ground: bool,
    pub autopilot_master: bool,
    pub parking_brake: bool,
}

impl TelemetrySnapshot {
    /// Number of values a data event must carry.
    pub fn width() -> usize { SimVar::iter().len() }

    /// Builds a snapshot from a payload ordered like [`SimVar`].
    ///
    /// # Errors
    /// [`SnapshotError::WrongWidth`] if the payload length does not match the
    /// subscription; no partial snapshot is produced in that case.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_values(values: &[f64]) -> Result<Self, SnapshotError> {
        if values.len() != Self::width() {
            return Err(SnapshotError::WrongWidth { expected: Self::width(), actual: values.len() });
        }
        let v = |var: SimVar| values[var.index()];
        let flag = |var: SimVar| v(var) > 0.5;
        Ok(Self {
            yoke_x: v(SimVar::YokeXPosition),
            yoke_y: v(SimVar::YokeYPosition),
            elevator_trim_pct: v(SimVar::ElevatorTrimPct),
            aileron_trim_pct: v(SimVar::AileronTrimPct),
            rudder_trim_pct: v(SimVar::RudderTrimPct),
            flaps_handle_index: v(SimVar::FlapsHandleIndex) as u8,
            flaps_handle_positions: v(SimVar::FlapsNumHandlePositions) as u8,
            flaps_left_pct: v(SimVar::TrailingEdgeFlapsLeftPercent),
            flaps_right_pct: v(SimVar::TrailingEdgeFlapsRightPercent),
            throttle_lever_pct: v(SimVar::ThrottleLeverPosition),
            indicated_airspeed_kt: v(SimVar::AirspeedIndicated),
            true_airspeed_kt: v(SimVar::AirspeedTrue),
            design_cruise_speed_kt: v(SimVar::DesignSpeedVc),
            design_takeoff_speed_kt: v(SimVar::DesignTakeoffSpeed),
            rotation_velocity: [
                v(SimVar::RotationVelocityBodyX),
                v(SimVar::RotationVelocityBodyY),
                v(SimVar::RotationVelocityBodyZ),
            ],
            g_force: v(SimVar::GForce),
            prop_rpm: v(SimVar::PropRpm),
            engine_count: v(SimVar::NumberOfEngines) as u8,
            gear_down: flag(SimVar::GearHandlePosition),
            on_ground: flag(SimVar::SimOnGround),
            autopilot_master: flag(SimVar::AutopilotMaster),
            parking_brake: flag(SimVar::BrakeParkingPosition),
        })
    }

    /// The payload a provider would deliver for this snapshot.
    pub fn to_values(&self) -> Vec<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        SimVar::iter()
            .map(|var| match var {
                SimVar::YokeXPosition => self.yoke_x,
                SimVar::YokeYPosition => self.yoke_y,
                SimVar::ElevatorTrimPct => self.elevator_trim_pct,
                SimVar::AileronTrimPct => self.aileron_trim_pct,
                SimVar::RudderTrimPct => self.rudder_trim_pct,
                SimVar::FlapsHandleIndex => f64::from(self.flaps_handle_index),
                SimVar::FlapsNumHandlePositions => f64::from(self.flaps_handle_positions),
                SimVar::TrailingEdgeFlapsLeftPercent => self.flaps_left_pct,
                SimVar::TrailingEdgeFlapsRightPercent => self.flaps_right_pct,
                SimVar::ThrottleLeverPosition => self.throttle_lever_pct,
                SimVar::AirspeedIndicated => self.indicated_airspeed_kt,
                SimVar::AirspeedTrue => self.true_airspeed_kt,
                SimVar::DesignSpeedVc => self.design_cruise_speed_kt,
                SimVar::DesignTakeoffSpeed => self.design_takeoff_speed_kt,
                SimVar::RotationVelocityBodyX => self.rotation_velocity[0],
                SimVar::RotationVelocityBodyY => self.rotation_velocity[1],
                SimVar::RotationVelocityBodyZ => self.rotation_velocity[2],
                SimVar::GForce => self.g_force,
                SimVar::PropRpm => self.prop_rpm,
                SimVar::NumberOfEngines => f64::from(self.engine_count),
                SimVar::GearHandlePosition => flag(self.gear_down),
                SimVar::SimOnGround => flag(self.on_ground),
                SimVar::AutopilotMaster => flag(self.autopilot_master),
                SimVar::BrakeParkingPosition => flag(self.parking_brake),
            })
            .collect()
    }
}

/// A snapshot together with the wall-clock instant the bridge received it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRecord {
    snapshot: TelemetrySnapshot,
    received_at: DateTime<Utc>,
}

impl TelemetryRecord {
    pub fn new(snapshot: TelemetrySnapshot, received_at: DateTime<Utc>) -> Self {
        Self { snapshot, received_at }
    }

    pub fn snapshot(&self) -> &TelemetrySnapshot { &self.snapshot }
    pub fn received_at(&self) -> DateTime<Utc> { self.received_at }
}
