//! Sensor reporter — sample, convert, publish.
//!
//! One invocation writes five values: the four sensor percentages and the
//! heartbeat timestamp.  Each write stands alone; a failure is reported
//! through the sink and the next write proceeds.  Nothing is retried; the
//! next periodic report supersedes a dropped value.

use crate::rtdb::paths;
use crate::sensors::SensorHub;

use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, RemoteStatePort, SensorPort};
use super::state::DeviceState;

pub struct SensorReporter {
    hub: SensorHub,
}

impl SensorReporter {
    pub fn new(full_scale: u16) -> Self {
        Self {
            hub: SensorHub::new(full_scale),
        }
    }

    pub fn report(
        &mut self,
        hw: &mut impl SensorPort,
        remote: &mut impl RemoteStatePort,
        clock: &impl ClockPort,
        state: &mut DeviceState,
        sink: &mut impl EventSink,
    ) {
        let readings = self.hub.sample(hw);

        for (i, (reading, path)) in readings.iter().zip(paths::SENSOR_VALUES).enumerate() {
            state.sensor_values[i] = reading.percent;
            let channel = (i + 1) as u8;
            match remote.write_int(path, i64::from(reading.percent)) {
                Ok(()) => sink.emit(&AppEvent::SensorWritten {
                    channel,
                    percent: reading.percent,
                }),
                Err(error) => sink.emit(&AppEvent::SensorWriteFailed { channel, error }),
            }
        }

        let epoch_secs = clock.epoch_secs();
        let stamp = i64::try_from(epoch_secs).unwrap_or(i64::MAX);
        match remote.write_int(paths::LAST_SEEN, stamp) {
            Ok(()) => sink.emit(&AppEvent::HeartbeatSent { epoch_secs }),
            Err(e) => sink.emit(&AppEvent::HeartbeatFailed(e)),
        }
    }
}
