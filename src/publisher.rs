use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, trace};

use crate::{
    models::status::StatusCode, ports::VariableReader, readings::ReadingStore,
    sensors::SensorTable,
};

/// How a sampled count of zero is reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroReadingPolicy {
    /// A zero count is reported as unavailable, same as "never sampled".
    #[default]
    Unavailable,

    /// A zero count is a value like any other.
    Publish,
}

/// Serves the current reading of each sensor to the protocol layer.
pub struct ReadingPublisher {
    sensors: Arc<SensorTable>,
    readings: Arc<ReadingStore>,
    zero_policy: ZeroReadingPolicy,
}

impl ReadingPublisher {
    pub fn new(
        sensors: Arc<SensorTable>,
        readings: Arc<ReadingStore>,
        zero_policy: ZeroReadingPolicy,
    ) -> Self {
        Self {
            sensors,
            readings,
            zero_policy,
        }
    }
}

impl VariableReader for ReadingPublisher {
    fn read_variable(&self, sensor: &str) -> Result<f64, StatusCode> {
        let pin = self
            .sensors
            .resolve(sensor)
            .map_err(|_| StatusCode::BadNodeIdUnknown)?;

        let reading = match self.readings.latest(sensor) {
            Some(reading) => reading,
            None => {
                error!("No data has been read yet. Sensor: <{}>", sensor);
                return Err(StatusCode::BadDataUnavailable);
            }
        };

        if reading.is_zero() && self.zero_policy == ZeroReadingPolicy::Unavailable {
            error!(
                "No edges were counted on pin {} for sensor <{}> in the last window.",
                pin, sensor
            );
            return Err(StatusCode::BadDataUnavailable);
        }

        let scaling = self
            .sensors
            .get(sensor)
            .map(|definition| definition.scaling)
            .unwrap_or_default();
        let value = scaling.apply(reading.frequency_hz());
        trace!("Read variable <{}> = {}", sensor, value);
        Ok(value)
    }
}
