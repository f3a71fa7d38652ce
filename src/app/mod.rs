//! Application core — pure clock logic, zero I/O.
//!
//! The orchestrator, its events, and the port traits every adapter
//! implements. All interaction with hardware happens through [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod orchestrator;
pub mod ports;
