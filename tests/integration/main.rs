//! Host-side integration tests.
//!
//! Everything runs against [`mock_hw::MockHardware`], which implements every
//! hardware port with a simulated clock, so no ESP32 toolchain is needed.

mod mock_hw;
mod orchestrator_tests;
mod sync_flow_tests;
