//! Counts rising edges on GPIO header pins, turns each window's count into a
//! frequency reading per named sensor, and serves the readings as read-only
//! Modbus TCP variables.

pub mod config;
pub mod counter;
pub mod externals;
pub mod models;
pub mod ports;
pub mod publisher;
pub mod readings;
pub mod sampler;
pub mod sensors;
pub mod tasks;

#[cfg(test)]
mod test_support;
