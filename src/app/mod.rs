//! Application core: pure domain logic, zero I/O.
//!
//! The control loop dispatch lives in [`service`]; it reads the knob,
//! drives the UI state machine and pushes volumes through **port traits**
//! defined in [`ports`], so this layer runs on the host with mock adapters.

pub mod events;
pub mod ports;
pub mod service;
