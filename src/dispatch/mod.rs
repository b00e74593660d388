//! The single-writer core: provider session lifecycle, peripheral input
//! arbitration and the rate-limited report path.

mod dispatch_loop;
mod state;
mod view;


pub use dispatch_loop::DispatchLoop;
pub use state::{ConnectionState, PollInterval, SessionAction, Transition};
pub use view::BridgeView;
