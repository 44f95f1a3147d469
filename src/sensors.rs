use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::models::{
    pin::Pin,
    scaling::{Scaling, ScalingError},
};

/// A named sensor bound to the header pin its signal is wired to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDefinition {
    pub name: String,
    pub pin: Pin,
    #[serde(default)]
    pub scaling: Scaling,
}

#[derive(Error, Debug, PartialEq)]
pub enum SensorTableError {
    #[error("Unknown sensor name <{0}>.")]
    UnknownSensor(String),

    #[error("The sensor table is empty.")]
    Empty,

    #[error("Sensor <{0}> is defined more than once.")]
    DuplicateName(String),

    #[error("Pin {0} is assigned to more than one sensor.")]
    DuplicatePin(Pin),

    #[error("Pin {0} is not a GPIO pin.")]
    NotGpio(Pin),

    #[error("Sensor <{0}> has an invalid scaling. Error: {1}")]
    InvalidScaling(String, ScalingError),
}

/// Static mapping from sensor name to pin. Immutable once built.
#[derive(Debug, Clone)]
pub struct SensorTable {
    sensors: Vec<SensorDefinition>,
}

impl SensorTable {
    pub fn new(sensors: Vec<SensorDefinition>) -> Result<Self, SensorTableError> {
        if sensors.is_empty() {
            return Err(SensorTableError::Empty);
        }

        let mut names = HashSet::new();
        let mut pins = HashSet::new();
        for sensor in sensors.iter() {
            if !names.insert(sensor.name.as_str()) {
                return Err(SensorTableError::DuplicateName(sensor.name.clone()));
            }
            if !pins.insert(sensor.pin) {
                return Err(SensorTableError::DuplicatePin(sensor.pin));
            }
            if !sensor.pin.is_gpio() {
                return Err(SensorTableError::NotGpio(sensor.pin));
            }
            sensor
                .scaling
                .validate()
                .map_err(|e| SensorTableError::InvalidScaling(sensor.name.clone(), e))?;
        }

        Ok(Self { sensors })
    }

    /// Get the pin a sensor is wired to.
    /// Logs every lookup so pin assignments show up in the console.
    pub fn resolve(&self, name: &str) -> Result<Pin, SensorTableError> {
        match self.get(name) {
            Some(sensor) => {
                info!(
                    "Sensor name <{}> has been assigned to pin {}",
                    name, sensor.pin
                );
                Ok(sensor.pin)
            }
            None => {
                let err = SensorTableError::UnknownSensor(name.to_string());
                error!("{}", err);
                Err(err)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&SensorDefinition> {
        self.sensors.iter().find(|sensor| sensor.name == name)
    }

    /// Sensors in table order.
    pub fn iter(&self) -> impl Iterator<Item = &SensorDefinition> {
        self.sensors.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sensors.iter().map(|sensor| sensor.name.as_str())
    }

    pub fn pins(&self) -> Vec<Pin> {
        self.sensors.iter().map(|sensor| sensor.pin).collect()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}
