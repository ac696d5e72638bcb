//! Core domain types and logic.

pub mod error;
pub mod period;
pub mod field_path;
pub mod security;
pub mod value;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod multi_period;
pub mod config_validation;
