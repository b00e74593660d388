use super::{ControlEvent, DataPeriod, ProviderError, ProviderEvent, TelemetryProvider};
use crate::telemetry::{SimVar, TelemetrySnapshot};
use chrono::{DateTime, TimeDelta, Utc};

const DESIGN_CRUISE_KT: f64 = 150.0;
const DESIGN_TAKEOFF_KT: f64 = 55.0;

/// Provider that flies a fixed takeoff-and-climb profile without a simulator.
///
/// Stands in for a real simulation when developing against a peripheral: it
/// honours the session protocol (deferred open, per-session subscriptions,
/// periodic delivery) and applies control events to its own state.
#[derive(Debug)]
pub struct SyntheticProvider {
    /// Number of `open` calls that fail before one succeeds.
    failing_opens: u32,
    /// Data deliveries after which the session is ended by the "simulation".
    session_length: Option<u32>,
    state: Session,
}

#[derive(Debug, Default)]
enum Session {
    #[default]
    Closed,
    Opening,
    Open(ActiveSession),
}

#[derive(Debug)]
struct ActiveSession {
    started: DateTime<Utc>,
    subscription: Vec<SimVar>,
    period: Option<TimeDelta>,
    last_delivery: Option<DateTime<Utc>>,
    deliveries: u32,
    flaps_override: Option<u8>,
    throttle_override: Option<u8>,
}

impl SyntheticProvider {
    pub fn new() -> Self { Self { failing_opens: 0, session_length: None, state: Session::Closed } }

    /// Lets the first `count` calls to `open` fail.
    pub fn with_failing_opens(mut self, count: u32) -> Self {
        self.failing_opens = count;
        self
    }

    /// Ends every session after `deliveries` data events.
    pub fn with_session_length(mut self, deliveries: u32) -> Self {
        self.session_length = Some(deliveries);
        self
    }

    fn period_delta(period: DataPeriod) -> Option<TimeDelta> {
        match period {
            DataPeriod::Once => None,
            DataPeriod::VisualFrame => Some(TimeDelta::milliseconds(16)),
            DataPeriod::SimFrame => Some(TimeDelta::milliseconds(33)),
            DataPeriod::Second => Some(TimeDelta::seconds(1)),
        }
    }

    fn active(&mut self) -> Result<&mut ActiveSession, ProviderError> {
        match &mut self.state {
            Session::Open(s) => Ok(s),
            _ => Err(ProviderError::NotConnected),
        }
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self { Self::new() }
}

impl ActiveSession {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            started: now,
            subscription: Vec::new(),
            period: None,
            last_delivery: None,
            deliveries: 0,
            flaps_override: None,
            throttle_override: None,
        }
    }

    fn due(&self, now: DateTime<Utc>) -> bool {
        match (self.period, self.last_delivery) {
            (_, None) => true,
            (Some(period), Some(last)) => now - last >= period,
            (None, Some(_)) => false,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn snapshot_at(&self, now: DateTime<Utc>) -> TelemetrySnapshot {
        let t = (now - self.started).num_milliseconds() as f64 / 1000.0;
        let ias = if t < 30.0 { t * 2.0 } else { (60.0 + (t - 30.0)).min(120.0) };
        let on_ground = ias < DESIGN_TAKEOFF_KT;
        let profile_flaps = u8::from(t < 60.0);
        let flaps = self.flaps_override.unwrap_or(profile_flaps);
        let throttle = self.throttle_override.map_or(if t < 90.0 { 100.0 } else { 75.0 }, f64::from);
        let flaps_pct = f64::from(flaps) * 100.0 / 3.0;
        TelemetrySnapshot {
            yoke_x: 0.1 * (t * 0.7).sin(),
            yoke_y: if on_ground { 0.0 } else { -0.15 + 0.05 * (t * 0.3).sin() },
            elevator_trim_pct: -12.0,
            aileron_trim_pct: 0.0,
            rudder_trim_pct: 2.0,
            flaps_handle_index: flaps,
            flaps_handle_positions: 4,
            flaps_left_pct: flaps_pct,
            flaps_right_pct: flaps_pct,
            throttle_lever_pct: throttle,
            indicated_airspeed_kt: ias,
            true_airspeed_kt: ias * 1.04,
            design_cruise_speed_kt: DESIGN_CRUISE_KT,
            design_takeoff_speed_kt: DESIGN_TAKEOFF_KT,
            rotation_velocity: [0.02 * (t * 0.5).sin(), 0.01 * (t * 0.2).cos(), 0.03 * (t * 0.7).cos()],
            g_force: 1.0 + 0.05 * (t * 1.3).sin(),
            prop_rpm: 1800.0 + throttle * 7.0,
            engine_count: 1,
            gear_down: t < 45.0,
            on_ground,
            autopilot_master: t > 120.0,
            parking_brake: false,
        }
    }
}

impl TelemetryProvider for SyntheticProvider {
    fn open(&mut self, _app_name: &str) -> Result<(), ProviderError> {
        if self.failing_opens > 0 {
            self.failing_opens -= 1;
            return Err(ProviderError::Unavailable);
        }
        self.state = Session::Opening;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ProviderError> {
        match std::mem::take(&mut self.state) {
            Session::Closed => Err(ProviderError::NotConnected),
            _ => Ok(()),
        }
    }

    fn add_to_subscription(&mut self, var: SimVar) -> Result<(), ProviderError> {
        self.active()?.subscription.push(var);
        Ok(())
    }

    fn request_periodic_data(&mut self, period: DataPeriod) -> Result<(), ProviderError> {
        let session = self.active()?;
        if session.subscription.is_empty() {
            return Err(ProviderError::Rejected("empty subscription".into()));
        }
        session.period = Self::period_delta(period);
        session.last_delivery = None;
        Ok(())
    }

    fn drain_events(&mut self) -> Vec<ProviderEvent> {
        let now = Utc::now();
        let session_length = self.session_length;
        match &mut self.state {
            Session::Closed => Vec::new(),
            Session::Opening => {
                self.state = Session::Open(ActiveSession::new(now));
                vec![ProviderEvent::Open]
            }
            Session::Open(session) => {
                if session_length.is_some_and(|len| session.deliveries >= len) {
                    self.state = Session::Closed;
                    return vec![ProviderEvent::Quit];
                }
                if session.subscription.is_empty() || !session.due(now) {
                    return vec![ProviderEvent::Null];
                }
                let values = session.snapshot_at(now).to_values();
                let payload = session.subscription.iter().map(|var| values[var.index()]).collect();
                session.last_delivery = Some(now);
                session.deliveries += 1;
                vec![ProviderEvent::Data(payload)]
            }
        }
    }

    fn transmit(&mut self, event: ControlEvent) -> Result<(), ProviderError> {
        let session = self.active()?;
        match event {
            ControlEvent::FlapsSet(index) if index > 3 => {
                return Err(ProviderError::Rejected(format!("flaps index {index} out of range")));
            }
            ControlEvent::FlapsSet(index) => session.flaps_override = Some(index),
            ControlEvent::ThrottleSet(pct) => session.throttle_override = Some(pct.min(100)),
        }
        Ok(())
    }
}
