//! Fuzz target: `ClockConfig::from_json`
//!
//! Arbitrary bytes must either be rejected or yield a configuration that
//! passes validation.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use segclock::config::ClockConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = ClockConfig::from_json(json) {
        assert!(config.validate().is_ok());
    }
});
