use super::cursor::{FrameError, FrameReader};
use super::frame::REPORT_SIZE;
use crate::util::{ScaleError, scale};

/// Full-scale reading of the throttle axis ADC.
pub const THROTTLE_AXIS_MAX: u16 = 4095;

/// Latest input state reported by the peripheral.
///
/// Inbound report layout: byte 0 is the report id and is skipped, followed by
/// `u8` requested flaps index, `u16` throttle axis and `u16` button mask,
/// little-endian. The remaining bytes are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeripheralObservation {
    pub requested_flaps_index: u8,
    pub throttle_axis: u16,
    pub buttons: u16,
}

impl PeripheralObservation {
    /// Decodes an inbound report.
    ///
    /// # Errors
    /// [`FrameError::WrongLength`] unless `raw` is exactly [`REPORT_SIZE`] bytes.
    pub fn decode(raw: &[u8]) -> Result<Self, FrameError> {
        if raw.len() != REPORT_SIZE {
            return Err(FrameError::WrongLength { expected: REPORT_SIZE, actual: raw.len() });
        }
        let mut r = FrameReader::new(raw);
        r.skip(1)?;
        Ok(Self {
            requested_flaps_index: r.take()?,
            throttle_axis: r.take()?,
            buttons: r.take()?,
        })
    }

    /// Throttle lever position in whole percent.
    ///
    /// # Errors
    /// [`ScaleError`] if the axis range is degenerate.
    pub fn throttle_pct(&self) -> Result<u8, ScaleError> {
        scale(0.0, f64::from(THROTTLE_AXIS_MAX), f64::from(self.throttle_axis), 0.0, 100.0, true)
    }

    pub fn button(&self, index: u8) -> bool { index < 16 && self.buttons & (1 << index) != 0 }
}
