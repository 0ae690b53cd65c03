//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the buzzer bank and the status LED and reads the sensor channels
//! straight from ADC1, exposing them through [`SensorPort`],
//! [`BuzzerPort`] and [`IndicatorPort`].  This is the only module in the
//! system that touches actual hardware.  On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::buzzer::BuzzerPattern;
use crate::app::ports::{BuzzerPort, IndicatorPort, SensorPort};
use crate::drivers::buzzer::BuzzerBank;
use crate::drivers::gpio::GpioOutput;
use crate::drivers::hw_init;
use crate::drivers::status_led::StatusLed;
use crate::pins;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    buzzers: BuzzerBank<GpioOutput>,
    led: StatusLed<GpioOutput>,
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    /// Build on the board pin map.  Call after
    /// [`hw_init::init_peripherals`].
    pub fn new() -> Self {
        Self {
            buzzers: BuzzerBank::new(pins::BUZZER_GPIOS.map(GpioOutput::new)),
            led: StatusLed::new(GpioOutput::new(pins::STATUS_LED_GPIO)),
        }
    }

    pub fn buzzer_pattern(&self) -> BuzzerPattern {
        self.buzzers.current()
    }

    pub fn status_led_on(&self) -> bool {
        self.led.is_on()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_analog(&mut self, channel: usize) -> u16 {
        pins::SENSOR_ADC1_CHANNELS
            .get(channel)
            .map_or(0, |&ch| hw_init::adc1_read(ch))
    }
}

// ── BuzzerPort / IndicatorPort implementation ─────────────────

impl BuzzerPort for HardwareAdapter {
    fn apply_pattern(&mut self, pattern: BuzzerPattern) {
        self.buzzers.apply(pattern);
    }

    fn all_low(&mut self) {
        self.buzzers.silence();
    }
}

impl IndicatorPort for HardwareAdapter {
    fn set_status_led(&mut self, on: bool) {
        self.led.set(on);
    }
}
