//! Outbound report sent to the control peripheral.
//!
//! # Wire Format (layout version 1)
//!
//! Fixed [`REPORT_SIZE`] bytes, little-endian, fields appended in this order:
//!
//! ```text
//! off  size  field
//!   0     1  report id (0x01)
//!   1     1  layout version
//!   2     4  flags (see FrameFlags)
//!   6     4  f32 indicated airspeed [kt]
//!  10    12  f32 angular acceleration x, y, z [rad/s²]
//!  22     4  f32 g force
//!  26     1  flaps handle index
//!  27     1  flaps handle positions
//!  28     1  flaps position        0..100 %   -> 0..255
//!  29     1  throttle lever        0..100 %   -> 0..255
//!  30     1  elevator trim      -100..100 %   -> 0..255
//!  31     1  speed to cruise       0..2       -> 0..255
//!  32     1  speed to takeoff      0..2       -> 0..255
//!  33     2  prop rpm
//!  35     1  engine count
//!  36     4  f32 yoke x
//!  40     4  f32 yoke y
//!  44     3  marker "SIM"
//!  47    17  zero padding
//! ```
//!
//! Any change to order or width requires a new [`LAYOUT_VERSION`].

use super::cursor::{FrameError, FrameWriter};
use crate::telemetry::{DerivedMetrics, TelemetrySnapshot};
use crate::util::scale_to_byte;

/// Size of every report exchanged with the peripheral, in both directions.
pub const REPORT_SIZE: usize = 64;
pub const OUTBOUND_REPORT_ID: u8 = 0x01;
pub const LAYOUT_VERSION: u8 = 1;
pub const FRAME_MARKER: &[u8; 3] = b"SIM";

/// Input ranges of the byte-scaled fields.
pub const FLAPS_RANGE: (f64, f64) = (0.0, 100.0);
pub const THROTTLE_RANGE: (f64, f64) = (0.0, 100.0);
pub const TRIM_RANGE: (f64, f64) = (-100.0, 100.0);
pub const SPEED_RATIO_RANGE: (f64, f64) = (0.0, 2.0);

/// Bit flags carried in the flags word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFlags(u32);

impl FrameFlags {
    pub const DATA_VALID: u32 = 1 << 0;
    pub const ON_GROUND: u32 = 1 << 1;
    pub const GEAR_DOWN: u32 = 1 << 2;
    pub const AUTOPILOT: u32 = 1 << 3;
    pub const PARKING_BRAKE: u32 = 1 << 4;
    pub const FLAPS_FOLLOW_SIM: u32 = 1 << 5;
    pub const THROTTLE_FOLLOW_SIM: u32 = 1 << 6;
    pub const CONNECTED: u32 = 1 << 7;

    pub fn set(&mut self, flag: u32, on: bool) {
        if on {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    pub fn contains(self, flag: u32) -> bool { self.0 & flag == flag }
    pub fn bits(self) -> u32 { self.0 }
    pub fn from_bits(bits: u32) -> Self { Self(bits) }
}

/// Everything the encoder needs, borrowed from the dispatch state at send time.
#[derive(Debug, Clone, Copy)]
pub struct OutboundFrame<'a> {
    pub snapshot: &'a TelemetrySnapshot,
    pub derived: &'a DerivedMetrics,
    pub data_valid: bool,
    pub connected: bool,
    pub flaps_follow_sim: bool,
    pub throttle_follow_sim: bool,
}

impl OutboundFrame<'_> {
    pub fn flags(&self) -> FrameFlags {
        let mut flags = FrameFlags::default();
        flags.set(FrameFlags::DATA_VALID, self.data_valid);
        flags.set(FrameFlags::ON_GROUND, self.snapshot.on_ground);
        flags.set(FrameFlags::GEAR_DOWN, self.snapshot.gear_down);
        flags.set(FrameFlags::AUTOPILOT, self.snapshot.autopilot_master);
        flags.set(FrameFlags::PARKING_BRAKE, self.snapshot.parking_brake);
        flags.set(FrameFlags::FLAPS_FOLLOW_SIM, self.flaps_follow_sim);
        flags.set(FrameFlags::THROTTLE_FOLLOW_SIM, self.throttle_follow_sim);
        flags.set(FrameFlags::CONNECTED, self.connected);
        flags
    }

    /// Builds the report bytes.
    ///
    /// # Errors
    /// [`FrameError::Scale`] if a scaled field has a degenerate range, or
    /// [`FrameError::Truncated`] if the layout outgrows [`REPORT_SIZE`].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn encode(&self) -> Result<[u8; REPORT_SIZE], FrameError> {
        let s = self.snapshot;
        let d = self.derived;
        let mut buf = [0u8; REPORT_SIZE];
        let mut w = FrameWriter::new(&mut buf);
        w.put(OUTBOUND_REPORT_ID)?;
        w.put(LAYOUT_VERSION)?;
        w.put(self.flags().bits())?;
        w.put(s.indicated_airspeed_kt as f32)?;
        for axis in d.angular_acceleration {
            w.put(axis as f32)?;
        }
        w.put(s.g_force as f32)?;
        w.put(s.flaps_handle_index)?;
        w.put(s.flaps_handle_positions)?;
        w.put(scaled_byte(FLAPS_RANGE, d.flaps_position_pct)?)?;
        w.put(scaled_byte(THROTTLE_RANGE, s.throttle_lever_pct)?)?;
        w.put(scaled_byte(TRIM_RANGE, s.elevator_trim_pct)?)?;
        w.put(scaled_byte(SPEED_RATIO_RANGE, d.speed_to_cruise)?)?;
        w.put(scaled_byte(SPEED_RATIO_RANGE, d.speed_to_takeoff)?)?;
        w.put(s.prop_rpm.clamp(0.0, f64::from(u16::MAX)) as u16)?;
        w.put(s.engine_count)?;
        w.put(s.yoke_x as f32)?;
        w.put(s.yoke_y as f32)?;
        w.put_bytes(FRAME_MARKER)?;
        Ok(buf)
    }
}

/// Byte value of a scaled field. A NaN reading is sent as 0 so a single bad
/// sample does not suppress the whole report.
fn scaled_byte(range: (f64, f64), value: f64) -> Result<u8, FrameError> {
    if value.is_nan() {
        return Ok(0);
    }
    Ok(scale_to_byte(range.0, range.1, value)?)
}
