//! Port traits (interfaces) for hexagonal architecture.

pub mod config_port;
pub mod fundamental_port;
