use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// TMP01 proportional-to-absolute-temperature output, volts per kelvin.
const TMP01_VOLTS_PER_KELVIN: f64 = 0.005;

const ABSOLUTE_ZERO_CELSIUS: f64 = -273.15;

/// Conversion from a measured frequency (Hz) to the published value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaling {
    /// `value = frequency * gain + offset`
    Linear { gain: f64, offset: f64 },

    /// TMP01 temperature sensor feeding an AD654 voltage-to-frequency
    /// converter. The AD654 full-scale relation is
    /// `f = V / (10 * R * C)`, so the sensor voltage is recovered from the
    /// frequency and divided by the TMP01 slope. Publishes degrees Celsius.
    Ad654Tmp01 {
        timing_resistor_ohms: f64,
        timing_capacitor_farads: f64,
    },
}

#[derive(Error, Debug, PartialEq)]
pub enum ScalingError {
    #[error("Linear scaling needs finite gain and offset.")]
    NonFinite,

    #[error("Timing components must be positive.")]
    NonPositiveTiming,
}

impl Default for Scaling {
    fn default() -> Self {
        Self::identity()
    }
}

impl Scaling {
    /// Publish the raw frequency.
    pub const fn identity() -> Self {
        Self::Linear {
            gain: 1f64,
            offset: 0f64,
        }
    }

    pub fn validate(&self) -> Result<(), ScalingError> {
        match *self {
            Scaling::Linear { gain, offset } => {
                if !gain.is_finite() || !offset.is_finite() {
                    return Err(ScalingError::NonFinite);
                }
            }
            Scaling::Ad654Tmp01 {
                timing_resistor_ohms,
                timing_capacitor_farads,
            } => {
                if !(timing_resistor_ohms > 0f64) || !(timing_capacitor_farads > 0f64) {
                    return Err(ScalingError::NonPositiveTiming);
                }
            }
        }
        Ok(())
    }

    pub fn apply(&self, frequency_hz: f64) -> f64 {
        match *self {
            Scaling::Linear { gain, offset } => frequency_hz * gain + offset,
            Scaling::Ad654Tmp01 {
                timing_resistor_ohms,
                timing_capacitor_farads,
            } => {
                let volts = frequency_hz * 10f64 * timing_resistor_ohms * timing_capacitor_farads;
                volts / TMP01_VOLTS_PER_KELVIN + ABSOLUTE_ZERO_CELSIUS
            }
        }
    }
}

impl Display for Scaling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scaling::Linear { gain, offset } => write!(f, "<Linear: x*{} + {}>", gain, offset),
            Scaling::Ad654Tmp01 {
                timing_resistor_ohms,
                timing_capacitor_farads,
            } => write!(
                f,
                "<AD654/TMP01: R={} ohm, C={} F>",
                timing_resistor_ohms, timing_capacitor_farads
            ),
        }
    }
}
