//! Segment clock firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod calendar;
pub mod config;
pub mod cron;
pub mod display;
pub mod error;
pub mod sync;

// The actual implementations are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
