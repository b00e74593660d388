//! Arbitration of control surfaces that can be moved by the simulation and by
//! the operator at the same time.

mod arbiter;


pub use arbiter::Arbiter;
