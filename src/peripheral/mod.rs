//! Everything on the peripheral side of the bridge: the report codec, the
//! transport abstraction and the receive worker.

mod cursor;
mod frame;
mod link;
mod observation;
mod receiver;
mod udp_link;

#[cfg(test)]
mod tests;

pub use cursor::{FrameError, FrameReader, FrameWriter};
pub use frame::{FrameFlags, LAYOUT_VERSION, OutboundFrame, REPORT_SIZE};
pub use link::{LinkError, PeripheralLink};
pub use observation::{PeripheralObservation, THROTTLE_AXIS_MAX};
pub use receiver::{pump, run_receiver};
pub use udp_link::UdpLink;
