use super::state::{ConnectionState, PollInterval, SessionAction, Transition};
use super::view::BridgeView;
use crate::config::BridgeConfig;
use crate::control::Arbiter;
use crate::logger::{LogLevel, LogSink};
use crate::peripheral::{OutboundFrame, PeripheralLink, PeripheralObservation};
use crate::provider::{ControlEvent, DataPeriod, ProviderEvent, TelemetryProvider};
use crate::telemetry::{DerivedMetrics, SimVar, TelemetryRecord, TelemetrySnapshot};
use crate::util::scale;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Reports a fault once when it appears and once when it disappears.
#[derive(Debug, Default)]
struct FaultLatch {
    armed: bool,
}

impl FaultLatch {
    fn trip(&mut self, log: &dyn LogSink, level: LogLevel, message: &str) {
        if !self.armed {
            log.record(level, message);
            self.armed = true;
        }
    }

    fn clear(&mut self, log: &dyn LogSink, message: &str) {
        if self.armed {
            log.record(LogLevel::Info, message);
            self.armed = false;
        }
    }
}

/// Which arbitrated surface an inbound report is applied to.
#[derive(Debug, Clone, Copy)]
enum Surface {
    Flaps,
    Throttle,
}

/// Owner of all bridge state.
///
/// Every cycle advances the provider session, applies queued peripheral
/// input and, rate limited, sends one report to the peripheral. Nothing in
/// here blocks; the caller decides how long to wait between cycles.
pub struct DispatchLoop<P: TelemetryProvider> {
    config: BridgeConfig,
    provider: P,
    link: Option<Arc<dyn PeripheralLink>>,
    inbound_rx: Option<mpsc::Receiver<Vec<u8>>>,
    log: Arc<dyn LogSink>,

    state: ConnectionState,
    poll: PollInterval,
    data_valid: bool,
    record: Option<TelemetryRecord>,
    derived: DerivedMetrics,
    observation: Option<PeripheralObservation>,

    flaps_arbiter: Arbiter<u8>,
    throttle_arbiter: Arbiter<u8>,
    flaps_follow_pending: bool,
    throttle_follow_pending: bool,

    last_send: Option<DateTime<Utc>>,
    min_send: TimeDelta,
    reports_sent: u64,

    open_fault: FaultLatch,
    subscription_fault: FaultLatch,
    payload_fault: FaultLatch,
    write_fault: FaultLatch,
    encode_fault: FaultLatch,
    seen_unknown: HashSet<u32>,
    seen_exceptions: HashSet<u32>,

    closed: bool,
    view_tx: watch::Sender<BridgeView>,
}

impl<P: TelemetryProvider> DispatchLoop<P> {
    /// Creates a disconnected loop without a peripheral attached.
    pub fn new(config: BridgeConfig, provider: P, log: Arc<dyn LogSink>) -> Self {
        let min_send = TimeDelta::from_std(config.min_send_interval).unwrap_or(TimeDelta::MAX);
        let (view_tx, _) = watch::channel(BridgeView::default());
        Self {
            config,
            provider,
            link: None,
            inbound_rx: None,
            log,
            state: ConnectionState::Disconnected,
            poll: PollInterval::Normal,
            data_valid: false,
            record: None,
            derived: DerivedMetrics::default(),
            observation: None,
            flaps_arbiter: Arbiter::new(0),
            throttle_arbiter: Arbiter::new(0),
            flaps_follow_pending: false,
            throttle_follow_pending: false,
            last_send: None,
            min_send,
            reports_sent: 0,
            open_fault: FaultLatch::default(),
            subscription_fault: FaultLatch::default(),
            payload_fault: FaultLatch::default(),
            write_fault: FaultLatch::default(),
            encode_fault: FaultLatch::default(),
            seen_unknown: HashSet::new(),
            seen_exceptions: HashSet::new(),
            closed: false,
            view_tx,
        }
    }

    /// Attaches the peripheral: reports are sent through `link`, inbound
    /// reports are read from `inbound_rx`.
    pub fn with_link(
        mut self,
        link: Arc<dyn PeripheralLink>,
        inbound_rx: mpsc::Receiver<Vec<u8>>,
    ) -> Self {
        self.link = Some(link);
        self.inbound_rx = Some(inbound_rx);
        self
    }

    pub fn view(&self) -> watch::Receiver<BridgeView> { self.view_tx.subscribe() }
    pub fn state(&self) -> ConnectionState { self.state }
    pub fn poll(&self) -> PollInterval { self.poll }
    pub fn data_valid(&self) -> bool { self.data_valid }
    pub fn record(&self) -> Option<&TelemetryRecord> { self.record.as_ref() }
    pub fn derived(&self) -> &DerivedMetrics { &self.derived }
    pub fn observation(&self) -> Option<&PeripheralObservation> { self.observation.as_ref() }
    pub fn reports_sent(&self) -> u64 { self.reports_sent }
    pub fn provider(&self) -> &P { &self.provider }

    /// Runs cycles until `c_tok` is cancelled, then closes the session.
    pub async fn run(mut self, c_tok: CancellationToken) {
        while !c_tok.is_cancelled() {
            let pause = self.cycle(Utc::now());
            tokio::time::sleep(pause).await;
        }
        self.shutdown();
    }

    /// Performs one iteration and returns how long to wait before the next.
    ///
    /// # Arguments
    /// * `now` – Time of this cycle, used to stamp telemetry and to rate limit sends.
    pub fn cycle(&mut self, now: DateTime<Utc>) -> Duration {
        if self.closed {
            return self.poll.duration(&self.config);
        }
        match self.state {
            ConnectionState::Disconnected => self.try_open(),
            ConnectionState::Connecting | ConnectionState::Connected => self.drain_provider(now),
        }
        self.drain_inbound();
        self.maybe_send(now);
        self.publish();
        self.poll.duration(&self.config)
    }

    /// Closes an open session. Only the first call has an effect, and no
    /// provider call is made by later cycles.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.state != ConnectionState::Disconnected {
            match self.provider.close() {
                Ok(()) => self.log.record(LogLevel::Info, "Provider session closed."),
                Err(e) => self.log.record(LogLevel::Error, &format!("Closing provider session failed: {e}")),
            }
        }
        self.state = ConnectionState::Disconnected;
        self.data_valid = false;
        self.poll = PollInterval::Long;
        self.publish();
    }

    fn try_open(&mut self) {
        match self.provider.open(&self.config.app_name) {
            Ok(()) => {
                self.log.record(LogLevel::Info, &format!("Provider session requested as '{}'.", self.config.app_name));
                self.open_fault.clear(self.log.as_ref(), "Provider reachable again.");
                self.state = ConnectionState::Connecting;
                self.poll = PollInterval::Normal;
            }
            Err(e) => {
                self.open_fault.trip(
                    self.log.as_ref(),
                    LogLevel::Warn,
                    &format!("Provider unavailable ({e}), retrying."),
                );
                self.poll = PollInterval::Long;
            }
        }
    }

    fn drain_provider(&mut self, now: DateTime<Utc>) {
        for event in self.provider.drain_events() {
            let Transition { next, poll, action } = self.state.on_event(&event);
            self.state = next;
            if let Some(interval) = poll {
                self.poll = interval;
            }
            match action {
                SessionAction::None => {}
                SessionAction::Subscribe => self.subscribe(),
                SessionAction::Ingest => {
                    if let ProviderEvent::Data(values) = &event {
                        self.ingest(values, now);
                    }
                }
                SessionAction::Drop => {
                    self.log.record(LogLevel::Info, "Provider session ended by the simulation.");
                    self.data_valid = false;
                    break;
                }
                SessionAction::ReportUnknown(id) => {
                    if self.seen_unknown.insert(id) {
                        self.log.record(LogLevel::Warn, &format!("Ignoring unknown provider event {id}."));
                    }
                }
                SessionAction::ReportException(code) => {
                    if self.seen_exceptions.insert(code) {
                        self.log.record(LogLevel::Error, &format!("Provider rejected a request with exception {code}."));
                    }
                }
            }
        }
    }

    fn subscribe(&mut self) {
        let result = SimVar::iter()
            .try_for_each(|var| {
                let (name, unit) = var.definition();
                self.log.record(LogLevel::Event, &format!("Subscribing to '{name}' in {unit}."));
                self.provider.add_to_subscription(var).map_err(|e| format!("{var}: {e}"))
            })
            .and_then(|()| {
                self.provider.request_periodic_data(DataPeriod::SimFrame).map_err(|e| format!("periodic request: {e}"))
            });
        match result {
            Ok(()) => {
                self.log.record(LogLevel::Log, &format!("Subscribed to {} variables.", SimVar::iter().len()));
                self.subscription_fault.clear(self.log.as_ref(), "Subscription restored.");
            }
            Err(e) => self.subscription_fault.trip(
                self.log.as_ref(),
                LogLevel::Error,
                &format!("Subscription failed at {e}."),
            ),
        }
    }

    fn ingest(&mut self, values: &[f64], now: DateTime<Utc>) {
        let snapshot = match TelemetrySnapshot::from_values(values) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.payload_fault.trip(
                    self.log.as_ref(),
                    LogLevel::Warn,
                    &format!("Dropping telemetry payload: {e}."),
                );
                return;
            }
        };
        self.payload_fault.clear(self.log.as_ref(), "Telemetry payload accepted again.");
        let record = TelemetryRecord::new(snapshot, now);
        let previous = if self.data_valid { self.record.as_ref() } else { None };
        self.derived = DerivedMetrics::compute(previous, &record);
        self.record = Some(record);
        self.data_valid = true;
    }

    fn drain_inbound(&mut self) {
        let Some(rx) = self.inbound_rx.as_mut() else { return };
        let mut frames = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            frames.push(raw);
        }
        for raw in frames {
            match PeripheralObservation::decode(&raw) {
                Ok(obs) => self.apply_observation(obs),
                Err(e) => self.log.record(LogLevel::Warn, &format!("Dropping malformed peripheral report: {e}.")),
            }
        }
    }

    fn apply_observation(&mut self, obs: PeripheralObservation) {
        self.observation = Some(obs);
        let sim = self.record.filter(|_| self.data_valid).map(|r| *r.snapshot());

        let flaps_remote = sim.map_or(*self.flaps_arbiter.last_remote(), |s| s.flaps_handle_index);
        self.arbitrate(Surface::Flaps, flaps_remote, obs.requested_flaps_index);

        let throttle_remote = match sim.map(|s| scale::<u8>(0.0, 100.0, s.throttle_lever_pct, 0.0, 100.0, true)) {
            None => *self.throttle_arbiter.last_remote(),
            Some(Ok(pct)) => pct,
            Some(Err(e)) => {
                self.log.record(LogLevel::Event, &format!("Simulation throttle unusable: {e}."));
                *self.throttle_arbiter.last_remote()
            }
        };
        match obs.throttle_pct() {
            Ok(local) => self.arbitrate(Surface::Throttle, throttle_remote, local),
            Err(e) => self.log.record(LogLevel::Event, &format!("Peripheral throttle unusable: {e}.")),
        }
    }

    /// Runs one arbiter step and writes a local change into the simulation.
    fn arbitrate(&mut self, surface: Surface, remote: u8, local: u8) {
        let (arbiter, load, pending) = match surface {
            Surface::Flaps => (&mut self.flaps_arbiter, self.config.flaps_cooldown, &mut self.flaps_follow_pending),
            Surface::Throttle => {
                (&mut self.throttle_arbiter, self.config.throttle_cooldown, &mut self.throttle_follow_pending)
            }
        };
        let local_changed = local != *arbiter.last_local();
        let remote_idle = arbiter.remote_cooldown() == 0;
        let granted = arbiter.set_requested(remote, local, load);
        if granted {
            *pending = true;
        }
        if !local_changed || granted || !remote_idle || self.state != ConnectionState::Connected {
            return;
        }
        let event = match surface {
            Surface::Flaps => ControlEvent::FlapsSet(local),
            Surface::Throttle => ControlEvent::ThrottleSet(local),
        };
        match self.provider.transmit(event) {
            Ok(()) => {
                self.log.record(LogLevel::Event, &format!("Wrote {event:?} into the simulation."));
                self.write_fault.clear(self.log.as_ref(), "Control writes accepted again.");
            }
            Err(e) => self.write_fault.trip(
                self.log.as_ref(),
                LogLevel::Error,
                &format!("Simulation rejected {event:?}: {e}."),
            ),
        }
    }

    fn maybe_send(&mut self, now: DateTime<Utc>) {
        let Some(link) = self.link.clone() else { return };
        if self.last_send.is_some_and(|last| now - last < self.min_send) {
            return;
        }
        let snapshot = self.record.map(|r| *r.snapshot()).unwrap_or_default();
        let frame = OutboundFrame {
            snapshot: &snapshot,
            derived: &self.derived,
            data_valid: self.data_valid,
            connected: self.state == ConnectionState::Connected,
            flaps_follow_sim: self.flaps_follow_pending || self.flaps_arbiter.remote_holds_lock(),
            throttle_follow_sim: self.throttle_follow_pending || self.throttle_arbiter.remote_holds_lock(),
        };
        match frame.encode() {
            Ok(report) => {
                link.send(&report);
                self.encode_fault.clear(self.log.as_ref(), "Peripheral reports encode again.");
                self.last_send = Some(now);
                self.reports_sent += 1;
                self.flaps_follow_pending = false;
                self.throttle_follow_pending = false;
            }
            Err(e) => self.encode_fault.trip(
                self.log.as_ref(),
                LogLevel::Error,
                &format!("Skipping peripheral report: {e}."),
            ),
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(BridgeView {
            state: self.state,
            poll: self.poll,
            data_valid: self.data_valid,
            record: self.record,
            derived: self.derived,
            observation: self.observation,
            reports_sent: self.reports_sent,
            flaps_lock: (self.flaps_arbiter.remote_cooldown(), self.flaps_arbiter.local_cooldown()),
            throttle_lock: (self.throttle_arbiter.remote_cooldown(), self.throttle_arbiter.local_cooldown()),
        });
    }
}
