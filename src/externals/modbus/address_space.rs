//! Layout of the sensor variables in the Modbus input register space.
//!
//! All variables live in a `Sensors` folder. Each one is a double occupying
//! four consecutive input registers, most significant word first, in sensor
//! table order:
//!
//! | Registers | Variable |
//! |-----------|----------|
//! | 0-3       | first sensor (`ns=1;s=<name>`) |
//! | 4-7       | second sensor |
//! | ...       | ... |

use std::{fmt::Display, ops::Range};

use thiserror::Error;

use crate::sensors::SensorTable;

pub const SENSORS_FOLDER: &str = "Sensors";

/// Registers used by one `Double` variable.
pub const REGISTERS_PER_DOUBLE: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Double,
}

/// A named, typed, read-only variable backed by a block of input registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNode {
    pub browse_name: String,
    pub node_id: String,
    pub data_type: DataType,
    pub start_register: u16,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressSpaceError {
    #[error("{0} variables do not fit in the input register space.")]
    TooManyVariables(usize),
}

#[derive(Debug, Clone)]
pub struct AddressSpace {
    folder: String,
    nodes: Vec<VariableNode>,
}

impl VariableNode {
    pub fn registers(&self) -> Range<u16> {
        self.start_register..self.start_register + REGISTERS_PER_DOUBLE
    }
}

impl Display for VariableNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Variable | {} ({}), {:?}, registers {}-{}>",
            self.browse_name,
            self.node_id,
            self.data_type,
            self.start_register,
            self.start_register + REGISTERS_PER_DOUBLE - 1
        )
    }
}

impl AddressSpace {
    /// Build one variable per sensor under the `Sensors` folder.
    pub fn from_sensors(sensors: &SensorTable) -> Result<Self, AddressSpaceError> {
        let max_nodes = (u16::MAX / REGISTERS_PER_DOUBLE) as usize;
        if sensors.len() > max_nodes {
            return Err(AddressSpaceError::TooManyVariables(sensors.len()));
        }

        let nodes = sensors
            .names()
            .enumerate()
            .map(|(index, name)| VariableNode {
                browse_name: name.to_string(),
                node_id: format!("ns=1;s={}", name),
                data_type: DataType::Double,
                start_register: index as u16 * REGISTERS_PER_DOUBLE,
            })
            .collect();

        Ok(Self {
            folder: SENSORS_FOLDER.to_string(),
            nodes,
        })
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn nodes(&self) -> &[VariableNode] {
        &self.nodes
    }

    /// Number of input registers covered by the variables.
    pub fn register_count(&self) -> u32 {
        self.nodes.len() as u32 * REGISTERS_PER_DOUBLE as u32
    }

    /// Find the variable whose register block contains `register`,
    /// together with its position in the folder.
    pub fn node_for_register(&self, register: u16) -> Option<(usize, &VariableNode)> {
        let index = (register / REGISTERS_PER_DOUBLE) as usize;
        self.nodes.get(index).map(|node| (index, node))
    }
}

/// Split a double into big-endian register words.
pub fn encode_double(value: f64) -> [u16; REGISTERS_PER_DOUBLE as usize] {
    let bits = value.to_bits();
    [
        (bits >> 48) as u16,
        (bits >> 32) as u16,
        (bits >> 16) as u16,
        bits as u16,
    ]
}

/// Reassemble a double from big-endian register words.
pub fn decode_double(words: &[u16]) -> Option<f64> {
    if words.len() != REGISTERS_PER_DOUBLE as usize {
        return None;
    }
    let bits = words
        .iter()
        .fold(0u64, |bits, word| (bits << 16) | *word as u64);
    Some(f64::from_bits(bits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{pin::Pin, scaling::Scaling},
        sensors::SensorDefinition,
    };

    fn table(names: &[(&str, u8)]) -> SensorTable {
        SensorTable::new(
            names
                .iter()
                .map(|(name, pin)| SensorDefinition {
                    name: name.to_string(),
                    pin: Pin::try_from(*pin).unwrap(),
                    scaling: Scaling::identity(),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_nodes_follow_table_order() {
        let space =
            AddressSpace::from_sensors(&table(&[("temperature", 11), ("flow", 13)])).unwrap();

        assert_eq!(space.folder(), "Sensors");
        assert_eq!(space.register_count(), 8);
        let temperature = &space.nodes()[0];
        assert_eq!(temperature.node_id, "ns=1;s=temperature");
        assert_eq!(temperature.data_type, DataType::Double);
        assert_eq!(temperature.registers(), 0..4);
        let flow = &space.nodes()[1];
        assert_eq!(flow.browse_name, "flow");
        assert_eq!(flow.registers(), 4..8);
    }

    #[test]
    fn test_node_for_register() {
        let space =
            AddressSpace::from_sensors(&table(&[("temperature", 11), ("flow", 13)])).unwrap();

        assert_eq!(space.node_for_register(0).unwrap().0, 0);
        assert_eq!(space.node_for_register(3).unwrap().0, 0);
        assert_eq!(space.node_for_register(4).unwrap().1.browse_name, "flow");
        assert!(space.node_for_register(8).is_none());
        assert!(space.node_for_register(u16::MAX).is_none());
    }

    #[test]
    fn test_double_word_order() {
        let words = encode_double(5f64);
        // 5.0 = 0x4014_0000_0000_0000
        assert_eq!(words, [0x4014, 0, 0, 0]);
        assert_eq!(decode_double(&words), Some(5f64));
        assert_eq!(decode_double(&words[..3]), None);
    }

    #[test]
    fn test_negative_double() {
        let value = -273.15f64;
        assert_eq!(decode_double(&encode_double(value)), Some(value));
    }
}
