//! Single-colour status LED.
//!
//! Lit while the device is signed in and the database client is ready.
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal::digital::OutputPin`; on ESP-IDF it wraps
//! GPIO2 through [`GpioOutput`](super::gpio::GpioOutput).

use embedded_hal::digital::{OutputPin, PinState};

pub struct StatusLed<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, on: false };
        led.set(false);
        led
    }

    pub fn set(&mut self, on: bool) {
        // A failed write leaves `on` stale; the next change retries.
        if self.pin.set_state(PinState::from(on)).is_ok() {
            self.on = on;
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
