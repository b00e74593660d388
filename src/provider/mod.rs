//! Interface to the telemetry provider of the flight simulation.

mod synthetic;

#[cfg(test)]
mod tests;

use crate::telemetry::SimVar;
use strum_macros::Display;

pub use synthetic::SyntheticProvider;

/// Something the provider reports when its queue is drained.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// The session handshake completed.
    Open,
    /// The simulation ended the session.
    Quit,
    /// Periodic data for the subscription, one value per [`SimVar`].
    Data(Vec<f64>),
    /// Nothing more is queued.
    Null,
    /// The provider rejected an earlier request.
    Exception { code: u32 },
    /// An event kind the bridge does not handle.
    Unknown(u32),
}

/// How often the provider delivers the subscribed data.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DataPeriod {
    Once,
    VisualFrame,
    SimFrame,
    Second,
}

/// A write into the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// Moves the flaps handle to the given detent.
    FlapsSet(u8),
    /// Sets all throttle levers, in percent.
    ThrottleSet(u8),
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No simulation is running or it refused the session.
    Unavailable,
    /// A call was made without an open session.
    NotConnected,
    /// The provider refused the request.
    Rejected(String),
}

impl std::error::Error for ProviderError {}

/// Session-based access to the telemetry provider.
///
/// Every call is expected to return promptly. Subscriptions belong to a
/// session and have to be issued again after every reconnect.
pub trait TelemetryProvider: Send {
    /// Opens a session under `app_name`. Success only means the request was
    /// accepted; the session is usable once [`ProviderEvent::Open`] arrives.
    ///
    /// # Errors
    /// [`ProviderError::Unavailable`] while no simulation accepts sessions.
    fn open(&mut self, app_name: &str) -> Result<(), ProviderError>;

    /// Closes the current session.
    ///
    /// # Errors
    /// [`ProviderError::NotConnected`] if there is no session.
    fn close(&mut self) -> Result<(), ProviderError>;

    /// Adds one variable to the data subscription.
    ///
    /// # Errors
    /// [`ProviderError`] if the variable is unknown or there is no session.
    fn add_to_subscription(&mut self, var: SimVar) -> Result<(), ProviderError>;

    /// Requests the subscription to be delivered every `period`.
    ///
    /// # Errors
    /// [`ProviderError`] if the request was refused.
    fn request_periodic_data(&mut self, period: DataPeriod) -> Result<(), ProviderError>;

    /// Takes every queued event, in arrival order.
    fn drain_events(&mut self) -> Vec<ProviderEvent>;

    /// Sends a control event into the simulation.
    ///
    /// # Errors
    /// [`ProviderError`] if the write was refused.
    fn transmit(&mut self, event: ControlEvent) -> Result<(), ProviderError>;
}
