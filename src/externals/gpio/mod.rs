pub mod simulated;
pub mod task;

#[cfg(feature = "rpi")]
pub mod rpi;
