use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::reading::Reading;

/// Latest reading per sensor. A sensor that has never been sampled has no
/// entry, which keeps "not sampled yet" distinct from a zero count.
#[derive(Default)]
pub struct ReadingStore {
    readings: RwLock<HashMap<String, Reading>>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the current reading for a sensor.
    pub fn record(&self, sensor: &str, reading: Reading) {
        self.readings.write().insert(sensor.to_string(), reading);
    }

    pub fn latest(&self, sensor: &str) -> Option<Reading> {
        self.readings.read().get(sensor).copied()
    }
}
