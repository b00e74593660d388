//! The authoritative telemetry snapshot, its subscription layout and the
//! metrics derived from consecutive readings.

mod derived;
mod sim_var;
mod snapshot;


pub use derived::DerivedMetrics;
pub use sim_var::SimVar;
pub use snapshot::{SnapshotError, TelemetryRecord, TelemetrySnapshot};
