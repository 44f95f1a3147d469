use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of pins on the Raspberry Pi expansion header.
pub const HEADER_PIN_COUNT: usize = 40;

/// BCM GPIO number for each physical header pin (index 0 is pin 1).
/// Power and ground pins have no GPIO.
const BCM_BY_PHYSICAL: [Option<u8>; HEADER_PIN_COUNT] = [
    None,     // 1  3V3
    None,     // 2  5V
    Some(2),  // 3
    None,     // 4  5V
    Some(3),  // 5
    None,     // 6  GND
    Some(4),  // 7
    Some(14), // 8
    None,     // 9  GND
    Some(15), // 10
    Some(17), // 11
    Some(18), // 12
    Some(27), // 13
    None,     // 14 GND
    Some(22), // 15
    Some(23), // 16
    None,     // 17 3V3
    Some(24), // 18
    Some(10), // 19
    None,     // 20 GND
    Some(9),  // 21
    Some(25), // 22
    Some(11), // 23
    Some(8),  // 24
    None,     // 25 GND
    Some(7),  // 26
    Some(0),  // 27
    Some(1),  // 28
    Some(5),  // 29
    None,     // 30 GND
    Some(6),  // 31
    Some(12), // 32
    Some(13), // 33
    None,     // 34 GND
    Some(19), // 35
    Some(16), // 36
    Some(26), // 37
    Some(20), // 38
    None,     // 39 GND
    Some(21), // 40
];

/// A physical pin on the 40-pin expansion header, numbered 1 through 40.
///
/// ```
/// use frequency_sensor_node::models::pin::Pin;
/// let pin = Pin::try_from(11).expect("Failed to get pin representation.");
/// assert_eq!(pin.bcm(), Some(17));
/// ```
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
#[serde(try_from = "u8", into = "u8")]
pub struct Pin(u8);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PinError {
    #[error("Pin {0} is not on the expansion header (1-40).")]
    OutOfRange(u8),
}

impl Pin {
    pub const fn new(number: u8) -> Option<Self> {
        if number == 0 || number as usize > HEADER_PIN_COUNT {
            return None;
        }
        Some(Self(number))
    }

    /// Slot used by fixed-size per-pin tables.
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// BCM GPIO number, if this header pin is wired to a GPIO.
    pub fn bcm(&self) -> Option<u8> {
        BCM_BY_PHYSICAL[self.index()]
    }

    pub fn is_gpio(&self) -> bool {
        self.bcm().is_some()
    }
}

impl TryFrom<u8> for Pin {
    type Error = PinError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PinError::OutOfRange(value))
    }
}

impl From<Pin> for u8 {
    fn from(value: Pin) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_range() {
        assert_eq!(Pin::try_from(0), Err(PinError::OutOfRange(0)));
        assert_eq!(Pin::try_from(41), Err(PinError::OutOfRange(41)));
        assert!(Pin::try_from(1).is_ok());
        assert!(Pin::try_from(40).is_ok());
    }

    #[test]
    fn test_bcm_lookup() {
        let pin = Pin::try_from(11).unwrap();
        assert_eq!(pin.bcm(), Some(17));
        assert_eq!(pin.index(), 10);

        let ground = Pin::try_from(6).unwrap();
        assert!(!ground.is_gpio());

        let last = Pin::try_from(40).unwrap();
        assert_eq!(last.bcm(), Some(21));
    }

    #[test]
    fn test_display() {
        let pin = Pin::try_from(11).unwrap();
        assert_eq!(pin.to_string(), "11");
    }
}
