//! GPIO / peripheral pin assignments for the GasGuard sensor board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! Target is the classic ESP32 (WROOM-32 DevKit).  Sensor inputs sit on
//! ADC1 because ADC2 is unusable while the WiFi radio is active.

// ---------------------------------------------------------------------------
// Buzzers (active HIGH, driven through NPN low-side switches)
// ---------------------------------------------------------------------------

/// Number of buzzer channels on the board.
pub const BUZZER_COUNT: usize = 4;

/// Digital outputs for buzzer channels 1–4.
pub const BUZZER_GPIOS: [i32; BUZZER_COUNT] = [5, 18, 19, 21];

// ---------------------------------------------------------------------------
// Gas / smoke sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// Number of analog sensor channels on the board.
pub const SENSOR_COUNT: usize = 4;

/// MQ-series sensor outputs, channels 1–4.
pub const SENSOR_GPIOS: [i32; SENSOR_COUNT] = [36, 39, 35, 33];

/// ADC1 channel numbers matching [`SENSOR_GPIOS`] on the ESP32
/// (GPIO36 = CH0, GPIO39 = CH3, GPIO35 = CH7, GPIO33 = CH5).
pub const SENSOR_ADC1_CHANNELS: [u32; SENSOR_COUNT] = [0, 3, 7, 5];

/// Full-scale raw reading of the 12-bit ADC.
pub const ADC_MAX_RAW: u16 = 4095;

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// Spare digital input with internal pull-up (header J4, reserved for a
/// silence button).
pub const AUX_INPUT_GPIO: i32 = 22;

/// On-board blue status LED (active HIGH on DevKit boards).
pub const STATUS_LED_GPIO: i32 = 2;
