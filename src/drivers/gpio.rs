//! Plain push-pull output pin.
//!
//! Wraps a GPIO number configured by [`hw_init`](super::hw_init) and
//! exposes it through `embedded_hal::digital::OutputPin`, so the buzzer
//! and LED drivers stay generic over any pin type.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use super::hw_init;

#[derive(Debug)]
pub struct GpioOutput {
    gpio: i32,
}

impl GpioOutput {
    /// The pin must already be configured as an output.
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}

impl ErrorType for GpioOutput {
    type Error = Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, true);
        Ok(())
    }
}
