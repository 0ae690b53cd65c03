//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                   |
//! |------------|--------------------|-------------------------------|
//! | `firebase` | RemoteStatePort    | Firebase RTDB (HTTPS + SSE)   |
//! | `hardware` | SensorPort         | ESP32 ADC1                    |
//! |            | BuzzerPort         | ESP32 GPIO (4 buzzers)        |
//! |            | IndicatorPort      | ESP32 GPIO (status LED)       |
//! | `log_sink` | EventSink          | Serial log output             |
//! | `time`     | ClockPort          | ESP32 system timer + SNTP     |
//! | `wifi`     | ConnectivityPort   | ESP-IDF WiFi STA              |

pub mod firebase;
pub mod hardware;
pub mod log_sink;
pub mod time;
pub(super) mod utils;
pub mod wifi;
