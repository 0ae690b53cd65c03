//! Output drivers, hardware initialisation, and peripheral helpers.

pub mod buzzer;
pub mod gpio;
pub mod hw_init;
pub mod status_led;
pub mod task_pin;
