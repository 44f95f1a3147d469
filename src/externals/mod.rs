pub mod gpio;
pub mod modbus;
