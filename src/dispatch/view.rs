use super::state::{ConnectionState, PollInterval};
use crate::diagnostics::DiagnosticRegistry;
use crate::peripheral::PeripheralObservation;
use crate::telemetry::{DerivedMetrics, TelemetryRecord};
use tokio::sync::watch;

/// Read-only copy of the dispatch state, published after every cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeView {
    pub state: ConnectionState,
    pub poll: PollInterval,
    pub data_valid: bool,
    pub record: Option<TelemetryRecord>,
    pub derived: DerivedMetrics,
    pub observation: Option<PeripheralObservation>,
    pub reports_sent: u64,
    /// (remote, local) cooldown counters of the flaps arbiter.
    pub flaps_lock: (u16, u16),
    /// (remote, local) cooldown counters of the throttle arbiter.
    pub throttle_lock: (u16, u16),
}

impl Default for BridgeView {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            poll: PollInterval::Normal,
            data_valid: false,
            record: None,
            derived: DerivedMetrics::default(),
            observation: None,
            reports_sent: 0,
            flaps_lock: (0, 0),
            throttle_lock: (0, 0),
        }
    }
}

impl BridgeView {
    /// Registers the dump actions of the dispatch state with the console.
    pub fn register_actions(view: &watch::Receiver<BridgeView>, registry: &mut DiagnosticRegistry) {
        let rx = view.clone();
        registry.register("telemetry", move || {
            let v = *rx.borrow();
            match v.record {
                Some(record) => format!(
                    "received {} (valid: {})\n{:#?}",
                    record.received_at().format("%H:%M:%S%.3f"),
                    v.data_valid,
                    record.snapshot()
                ),
                None => String::from("no telemetry received yet"),
            }
        });
        let rx = view.clone();
        registry.register("derived", move || format!("{:#?}", rx.borrow().derived));
        let rx = view.clone();
        registry.register("peripheral", move || match rx.borrow().observation {
            Some(obs) => format!("{obs:#?}"),
            None => String::from("no peripheral input received yet"),
        });
        let rx = view.clone();
        registry.register("connection", move || {
            let v = *rx.borrow();
            format!(
                "state: {}, poll: {}, data valid: {}, reports sent: {}, flaps lock: {:?}, throttle lock: {:?}",
                v.state, v.poll, v.data_valid, v.reports_sent, v.flaps_lock, v.throttle_lock
            )
        });
    }
}
