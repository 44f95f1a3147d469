use std::{sync::Arc, time::Duration};

use tracing::{debug, error};

use crate::{
    counter::EdgeCounter, models::reading::Reading, readings::ReadingStore, sensors::SensorTable,
};

/// Turns per-pin edge counts into per-sensor readings.
/// The only component that resets counters.
#[derive(Clone)]
pub struct Sampler {
    sensors: Arc<SensorTable>,
    counter: Arc<EdgeCounter>,
    readings: Arc<ReadingStore>,
    window: Duration,
}

impl Sampler {
    pub fn new(
        sensors: Arc<SensorTable>,
        counter: Arc<EdgeCounter>,
        readings: Arc<ReadingStore>,
        window: Duration,
    ) -> Self {
        Self {
            sensors,
            counter,
            readings,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Take the count for every configured sensor and store it as that
    /// sensor's current reading.
    pub fn sample(&self) {
        for name in self.sensors.names() {
            let pin = match self.sensors.resolve(name) {
                Ok(pin) => pin,
                Err(e) => {
                    error!("Skipping sensor. Error: {}", e);
                    continue;
                }
            };
            let reading = Reading::new(self.counter.take(pin), self.window);
            debug!("Sampled sensor <{}>: {}", name, reading);
            self.readings.record(name, reading);
        }
    }
}
