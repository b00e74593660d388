use super::snapshot::{TelemetryRecord, TelemetrySnapshot};

/// Values computed from the current reading and the one before it.
///
/// Every rate is zero when no time has passed between the two readings, and
/// every ratio is zero when its reference is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedMetrics {
    /// Body angular acceleration (x: pitch, y: yaw, z: roll) in rad/s².
    pub angular_acceleration: [f64; 3],
    /// Effective trailing edge flap extension in percent.
    pub flaps_position_pct: f64,
    /// Indicated airspeed relative to the design cruise speed.
    pub speed_to_cruise: f64,
    /// Indicated airspeed relative to the design takeoff speed.
    pub speed_to_takeoff: f64,
}

impl DerivedMetrics {
    /// Derives the metrics for `current`, using `previous` for rates.
    ///
    /// Without a previous record (first reading after start or reconnect) the
    /// rates are zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(previous: Option<&TelemetryRecord>, current: &TelemetryRecord) -> Self {
        let now = current.snapshot();
        let angular_acceleration = previous.map_or([0.0; 3], |prev| {
            let dt = current.received_at() - prev.received_at();
            let dt_secs = dt.num_microseconds().unwrap_or(0) as f64 / 1_000_000.0;
            Self::rate(prev.snapshot().rotation_velocity, now.rotation_velocity, dt_secs)
        });
        Self {
            angular_acceleration,
            flaps_position_pct: Self::effective_flaps(now),
            speed_to_cruise: Self::ratio(now.indicated_airspeed_kt, now.design_cruise_speed_kt),
            speed_to_takeoff: Self::ratio(now.indicated_airspeed_kt, now.design_takeoff_speed_kt),
        }
    }

    fn rate(previous: [f64; 3], current: [f64; 3], dt_secs: f64) -> [f64; 3] {
        if dt_secs <= 0.0 {
            return [0.0; 3];
        }
        [
            (current[0] - previous[0]) / dt_secs,
            (current[1] - previous[1]) / dt_secs,
            (current[2] - previous[2]) / dt_secs,
        ]
    }

    /// Larger of the left and right flap sensors. `f64::max` skips a NaN
    /// operand, so a single failed channel falls back to the other one.
    fn effective_flaps(snapshot: &TelemetrySnapshot) -> f64 {
        snapshot.flaps_left_pct.max(snapshot.flaps_right_pct)
    }

    #[allow(clippy::float_cmp)]
    fn ratio(value: f64, reference: f64) -> f64 {
        if reference == 0.0 { 0.0 } else { value / reference }
    }
}
