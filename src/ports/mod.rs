//! Port traits at the edge of the analytics engine.

pub mod config_port;
pub mod data_port;
