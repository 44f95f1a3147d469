pub mod address_space;
pub mod server;
pub mod service;
pub mod task;
