//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                   | Connects to                 |
//! |------------|------------------------------|-----------------------------|
//! | `board`    | DisplayPort, StationPort,    | the three below, composed   |
//! |            | TimePort, MaintenancePort    | + heap statistics           |
//! | `ht16k33`  | DisplayPort                  | HT16K33 over I2C            |
//! | `log_sink` | EventSink                    | Serial log output           |
//! | `station`  | StationPort                  | ESP-IDF WiFi STA            |
//! | `time`     | TimePort                     | RTC, esp_timer, SNTP        |

pub mod board;
pub mod ht16k33;
pub mod log_sink;
pub mod station;
pub mod time;
