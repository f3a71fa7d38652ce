//! Peripheral helpers that sit outside the port boundary.

pub mod watchdog;
