//! Service configuration.
//!
//! Every value has a compiled-in default, so the service runs without any
//! file. A YAML file passed on the command line may override any subset of
//! fields; missing fields keep their defaults.

use std::{fmt::Display, fs, net::SocketAddr, path::Path, time::Duration};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    models::{pin::Pin, scaling::Scaling},
    publisher::ZeroReadingPolicy,
    sensors::{SensorDefinition, SensorTable, SensorTableError},
};

pub const DEFAULT_SAMPLING_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_PORT: u16 = 4334;
pub const TEMPERATURE_SENSOR: &str = "temperature";
pub const TEMPERATURE_PIN: Pin = match Pin::new(11) {
    Some(pin) => pin,
    None => panic!("pin 11 is on the header"),
};

/// Roughly room temperature for the AD654/TMP01 chain with 200 ohm and 1 uF timing.
pub const DEFAULT_SIMULATED_FREQUENCY_HZ: f64 = 745f64;

/// Slowest square wave the simulated source can produce: one edge per day.
pub const MIN_SIMULATED_FREQUENCY_HZ: f64 = 1f64 / 86_400f64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sensor name to pin table.
    pub sensors: Vec<SensorDefinition>,

    /// Width of each edge-counting window.
    pub sampling_interval_ms: u64,

    pub zero_readings: ZeroReadingPolicy,

    pub server: ServerConfig,

    pub edge_source: EdgeSourceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the Modbus TCP listener binds to.
    pub address: String,
    pub port: u16,
    /// Path component of the advertised endpoint URL.
    pub resource_path: String,
    pub build_info: BuildInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildInfo {
    pub product_name: String,
    pub build_number: String,
    pub build_date: NaiveDate,
}

/// Where edge events come from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeSourceConfig {
    /// Square wave on every sensor pin.
    Simulated { frequency_hz: f64 },

    /// Raspberry Pi GPIO interrupts. Needs the `rpi` feature.
    Gpio,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Sampling interval must be at least 1 ms.")]
    ZeroInterval,

    #[error("Invalid sensor table. Error: {0}")]
    InvalidSensorTable(#[from] SensorTableError),

    #[error("Simulated frequency must be finite and at least one cycle per day, got {0} Hz.")]
    InvalidSimulatedFrequency(f64),

    #[error("GPIO edge source needs a build with the `rpi` feature.")]
    GpioUnsupported,

    #[error("Server port must not be 0.")]
    ZeroPort,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensors: vec![SensorDefinition {
                name: TEMPERATURE_SENSOR.to_string(),
                pin: TEMPERATURE_PIN,
                scaling: Scaling::identity(),
            }],
            sampling_interval_ms: DEFAULT_SAMPLING_INTERVAL_MS,
            zero_readings: ZeroReadingPolicy::default(),
            server: ServerConfig::default(),
            edge_source: EdgeSourceConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            resource_path: "Dipper".to_string(),
            build_info: BuildInfo::default(),
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            product_name: "TemperatureSensor".to_string(),
            build_number: "0001".to_string(),
            build_date: NaiveDate::from_ymd_opt(2016, 8, 19).unwrap_or_default(),
        }
    }
}

/// Real GPIO when the build can read it, otherwise the simulator.
impl Default for EdgeSourceConfig {
    #[cfg(feature = "rpi")]
    fn default() -> Self {
        Self::Gpio
    }

    #[cfg(not(feature = "rpi"))]
    fn default() -> Self {
        Self::Simulated {
            frequency_hz: DEFAULT_SIMULATED_FREQUENCY_HZ,
        }
    }
}

impl Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (build {}, {})",
            self.product_name, self.build_number, self.build_date
        )
    }
}

impl ServerConfig {
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Endpoint URL advertised for a listener bound to `bound`.
    pub fn endpoint_url(&self, bound: SocketAddr) -> String {
        format!(
            "modbus+tcp://{}/{}",
            bound,
            self.resource_path.trim_start_matches('/')
        )
    }
}

impl Config {
    /// Load a configuration from a YAML file. Fields missing from the file
    /// keep their compiled-in defaults. Call [`Config::validate`] once any
    /// command line overrides are applied.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Failed to load configuration from {:?}", path))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yml::from_str(contents).context("Failed to parse YAML configuration")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.server.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        match self.edge_source {
            EdgeSourceConfig::Simulated { frequency_hz } => {
                if !frequency_hz.is_finite() || frequency_hz < MIN_SIMULATED_FREQUENCY_HZ {
                    return Err(ConfigError::InvalidSimulatedFrequency(frequency_hz));
                }
            }
            EdgeSourceConfig::Gpio => {
                if !cfg!(feature = "rpi") {
                    return Err(ConfigError::GpioUnsupported);
                }
            }
        }
        self.sensor_table()?;
        Ok(())
    }

    pub fn sampling_interval(&self) -> Duration {
        Duration::from_millis(self.sampling_interval_ms)
    }

    pub fn sensor_table(&self) -> Result<SensorTable, ConfigError> {
        Ok(SensorTable::new(self.sensors.clone())?)
    }
}
