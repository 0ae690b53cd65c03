//! Device state shared between the orchestrator's components.
//!
//! Each field has exactly one writer:
//!
//! | Field             | Writer                 |
//! |-------------------|------------------------|
//! | `sensor_values`   | sensor reporter        |
//! | `smoke_threshold` | remote command handler |
//! | `buzzer_test`     | remote command handler |
//! | `signed_in`       | startup                |

use crate::pins::SENSOR_COUNT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    /// Last reported percentages, channel 1 first.
    pub sensor_values: [i32; SENSOR_COUNT],
    /// Alarm threshold pushed from the database.  Stored only.
    pub smoke_threshold: i32,
    /// Run the buzzer self-test pattern.
    pub buzzer_test: bool,
    /// Anonymous sign-up succeeded at startup.
    pub signed_in: bool,
}

impl DeviceState {
    pub fn new(default_smoke_threshold: i32) -> Self {
        Self {
            sensor_values: [0; SENSOR_COUNT],
            smoke_threshold: default_smoke_threshold,
            buzzer_test: false,
            signed_in: false,
        }
    }
}
