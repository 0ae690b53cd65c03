//! Sensor subsystem — raw-to-percent conversion and the [`SensorHub`].
//!
//! The four gas/smoke sensors are plain analog outputs on ADC1.  Each raw
//! 12-bit sample is mapped linearly onto 0..=100 with integer truncation.
//! The mapping is not clamped, so a raw value above full scale would
//! extrapolate past 100.

use crate::app::ports::SensorPort;
use crate::pins::SENSOR_COUNT;

/// Linear re-map of `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Integer arithmetic with truncation toward zero, no clamping.  A
/// degenerate input range maps everything to `out_min`.
pub fn map_range(x: i64, in_min: i64, in_max: i64, out_min: i64, out_max: i64) -> i64 {
    let span = in_max - in_min;
    if span == 0 {
        return out_min;
    }
    (x - in_min) * (out_max - out_min) / span + out_min
}

/// Convert a raw sample to a 0..=100 percentage of `full_scale`.
pub fn raw_to_percent(raw: u16, full_scale: u16) -> i32 {
    let pct = map_range(i64::from(raw), 0, i64::from(full_scale), 0, 100);
    i32::try_from(pct).unwrap_or(i32::MAX)
}

/// One channel's sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub raw: u16,
    pub percent: i32,
}

/// Samples every channel through a [`SensorPort`].
pub struct SensorHub {
    full_scale: u16,
}

impl SensorHub {
    pub fn new(full_scale: u16) -> Self {
        Self { full_scale }
    }

    /// Read all four channels in order.
    pub fn sample(&self, hw: &mut impl SensorPort) -> [SensorReading; SENSOR_COUNT] {
        core::array::from_fn(|channel| {
            let raw = hw.read_analog(channel);
            SensorReading {
                raw,
                percent: raw_to_percent(raw, self.full_scale),
            }
        })
    }
}
