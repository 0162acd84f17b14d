//! The continuous task-assignment engine: Selector, Dispatcher, Collector,
//! Adaptive Controller, and the Phase Driver that wraps them in a
//! deadline-bounded loop.

mod cancellation;
mod collector;
mod controller;
mod dispatcher;
mod phase_driver;
mod selector;
mod transport;

pub use cancellation::PhaseCancellation;
pub use collector::Collector;
pub use controller::AdaptiveController;
pub use dispatcher::{BatchHandle, Dispatcher};
pub use phase_driver::PhaseDriver;
pub use selector::Selector;
pub use transport::{MinerTransport, TransportError};
