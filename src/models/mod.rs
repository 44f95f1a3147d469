pub mod edge_event;
pub mod pin;
pub mod reading;
pub mod scaling;
pub mod status;
