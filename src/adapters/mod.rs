//! Concrete adapter implementations for ports.

pub mod csv_store;
pub mod file_config_adapter;
pub mod registry_csv;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;
#[cfg(feature = "postgres")]
pub mod postgres_store;
