use crate::config::BridgeConfig;
use crate::provider::ProviderEvent;
use std::time::Duration;
use strum_macros::Display;

/// Lifecycle of the session with the telemetry provider.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    /// Open was accepted, the provider has not confirmed the session yet.
    Connecting,
    Connected,
}

/// Three-level backoff of the dispatch loop.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PollInterval {
    /// Data is flowing.
    Short,
    /// Connected but idle.
    Normal,
    /// No session.
    Long,
}

impl PollInterval {
    pub fn duration(self, config: &BridgeConfig) -> Duration {
        match self {
            PollInterval::Short => config.poll_short,
            PollInterval::Normal => config.poll_normal,
            PollInterval::Long => config.poll_long,
        }
    }
}

/// Side effect the dispatch loop performs for a provider event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    None,
    /// Issue the data subscriptions and the periodic request.
    Subscribe,
    /// Replace the snapshot with the event payload.
    Ingest,
    /// Forget the session and invalidate cached data.
    Drop,
    /// Report an id the bridge has no handling for.
    ReportUnknown(u32),
    /// Report a request the provider refused.
    ReportException(u32),
}

/// Outcome of feeding one provider event into [`ConnectionState::on_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ConnectionState,
    /// New poll interval, `None` keeps the current one.
    pub poll: Option<PollInterval>,
    pub action: SessionAction,
}

impl ConnectionState {
    /// Pure transition function of the session state machine.
    pub fn on_event(self, event: &ProviderEvent) -> Transition {
        let (next, poll, action) = match event {
            ProviderEvent::Open => {
                (ConnectionState::Connected, Some(PollInterval::Normal), SessionAction::Subscribe)
            }
            ProviderEvent::Data(_) => (self, Some(PollInterval::Short), SessionAction::Ingest),
            ProviderEvent::Quit => {
                (ConnectionState::Disconnected, Some(PollInterval::Long), SessionAction::Drop)
            }
            ProviderEvent::Null => (self, Some(PollInterval::Normal), SessionAction::None),
            ProviderEvent::Exception { code } => (self, None, SessionAction::ReportException(*code)),
            ProviderEvent::Unknown(id) => (self, None, SessionAction::ReportUnknown(*id)),
        };
        Transition { next, poll, action }
    }
}
