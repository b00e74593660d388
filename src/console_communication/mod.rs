//! TCP endpoint of the diagnostic console. Messages are protobuf encoded
//! and prefixed with their length as big-endian `u32`.

mod bridge_messages;
mod console_endpoint;
mod console_messenger;

#[cfg(test)]
mod tests;

pub use console_messenger::ConsoleMessenger;
