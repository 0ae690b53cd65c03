//! Four-channel buzzer bank.
//!
//! Each channel is an active-HIGH output driving a buzzer through a
//! low-side transistor.  Patterns are applied channel 1 first; there is no
//! latch, so the outputs settle within a few microseconds of each other.
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal::digital::OutputPin`.  On ESP-IDF the pins
//! are [`GpioOutput`](super::gpio::GpioOutput)s; tests can use any pin.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::app::buzzer::BuzzerPattern;
use crate::pins::BUZZER_COUNT;

pub struct BuzzerBank<P: OutputPin> {
    pins: [P; BUZZER_COUNT],
    current: BuzzerPattern,
}

impl<P: OutputPin> BuzzerBank<P> {
    /// Take ownership of the pins and drive them all low.
    pub fn new(pins: [P; BUZZER_COUNT]) -> Self {
        let mut bank = Self {
            pins,
            current: BuzzerPattern::SILENT,
        };
        bank.write(BuzzerPattern::SILENT);
        bank
    }

    pub fn apply(&mut self, pattern: BuzzerPattern) {
        self.write(pattern);
    }

    pub fn silence(&mut self) {
        self.write(BuzzerPattern::SILENT);
    }

    /// Last pattern written.
    pub fn current(&self) -> BuzzerPattern {
        self.current
    }

    fn write(&mut self, pattern: BuzzerPattern) {
        for (i, pin) in self.pins.iter_mut().enumerate() {
            if pin.set_state(PinState::from(pattern.level(i))).is_err() {
                warn!("Buzzer: channel {} write failed", i + 1);
            }
        }
        self.current = pattern;
    }
}
