use strum_macros::Display;

#[derive(Debug, Display)]
pub enum LinkError {
    /// The device could not be opened or is gone.
    Unavailable(String),
    Io(std::io::Error),
}

impl std::error::Error for LinkError {}

impl From<std::io::Error> for LinkError {
    fn from(value: std::io::Error) -> Self { LinkError::Io(value) }
}

/// Raw report transport to the control peripheral.
///
/// All methods take `&self`: the link is shared between the dispatch loop,
/// which sends, and the receive worker, which polls for input.
pub trait PeripheralLink: Send + Sync {
    /// Opens the connection to the device.
    ///
    /// # Errors
    /// [`LinkError`] if the device cannot be reached.
    fn open(&self) -> Result<(), LinkError>;

    fn close(&self);

    /// Enables or disables delivery of inbound reports.
    fn set_reception(&self, enabled: bool);

    /// Whether at least one inbound report is waiting.
    fn data_available(&self) -> bool;

    /// Takes the next waiting inbound report, if any.
    fn receive(&self) -> Option<Vec<u8>>;

    /// Sends one report. Delivery is not confirmed.
    fn send(&self, report: &[u8]);
}
