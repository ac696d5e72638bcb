//! Configuration validation.
//!
//! Validates store, registry and logging settings before any store is
//! opened, so misconfiguration surfaces as a config error rather than a
//! failed lookup.

use crate::domain::error::FundamentalsError;
use crate::ports::config_port::ConfigPort;

/// Storage backends selectable through `[store] backend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Csv,
    Sqlite,
    Postgres,
}

impl StoreBackend {
    pub fn name(self) -> &'static str {
        match self {
            StoreBackend::Csv => "csv",
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Postgres => "postgres",
        }
    }
}

pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<StoreBackend, FundamentalsError> {
    let backend = store_backend(config)?;
    validate_backend_settings(config, backend)?;
    validate_registry(config)?;
    validate_logging(config)?;
    Ok(backend)
}

/// Backend named in `[store] backend`, defaulting to `csv`.
pub fn store_backend(config: &dyn ConfigPort) -> Result<StoreBackend, FundamentalsError> {
    let raw = config
        .get_string("store", "backend")
        .unwrap_or_else(|| "csv".to_string());
    match raw.trim().to_lowercase().as_str() {
        "csv" => Ok(StoreBackend::Csv),
        "sqlite" => Ok(StoreBackend::Sqlite),
        "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
        other => Err(FundamentalsError::ConfigInvalid {
            section: "store".to_string(),
            key: "backend".to_string(),
            reason: format!("unknown backend '{}', expected csv, sqlite or postgres", other),
        }),
    }
}

fn validate_backend_settings(
    config: &dyn ConfigPort,
    backend: StoreBackend,
) -> Result<(), FundamentalsError> {
    match backend {
        StoreBackend::Csv => require(config, "csv", "path"),
        StoreBackend::Sqlite => {
            require(config, "sqlite", "path")?;
            let pool_size = config.get_int("sqlite", "pool_size", 4);
            if !(1..=64).contains(&pool_size) {
                return Err(FundamentalsError::ConfigInvalid {
                    section: "sqlite".to_string(),
                    key: "pool_size".to_string(),
                    reason: "pool_size must be between 1 and 64".to_string(),
                });
            }
            Ok(())
        }
        StoreBackend::Postgres => {
            if config.has("postgres", "connection_string") || config.has("database", "conninfo") {
                Ok(())
            } else {
                Err(FundamentalsError::ConfigMissing {
                    section: "postgres".to_string(),
                    key: "connection_string".to_string(),
                })
            }
        }
    }
}

fn validate_registry(config: &dyn ConfigPort) -> Result<(), FundamentalsError> {
    match config.get_string("registry", "path") {
        Some(p) if p.trim().is_empty() => Err(FundamentalsError::ConfigInvalid {
            section: "registry".to_string(),
            key: "path".to_string(),
            reason: "path must not be blank".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_logging(config: &dyn ConfigPort) -> Result<(), FundamentalsError> {
    match config.get_string("logging", "level") {
        Some(level) if !LOG_LEVELS.contains(&level.trim().to_lowercase().as_str()) => {
            Err(FundamentalsError::ConfigInvalid {
                section: "logging".to_string(),
                key: "level".to_string(),
                reason: format!("level must be one of {}", LOG_LEVELS.join(", ")),
            })
        }
        _ => Ok(()),
    }
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), FundamentalsError> {
    if config.has(section, key) {
        Ok(())
    } else {
        Err(FundamentalsError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }
        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    #[test]
    fn csv_backend_is_default() {
        let config = MapConfig::new(&[("csv", "path", "/data/fundamentals")]);
        assert_eq!(validate_config(&config).unwrap(), StoreBackend::Csv);
    }

    #[test]
    fn csv_requires_path() {
        let config = MapConfig::new(&[]);
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, FundamentalsError::ConfigMissing { section, key } if section == "csv" && key == "path"));
    }

    #[test]
    fn unknown_backend() {
        let config = MapConfig::new(&[("store", "backend", "mongo")]);
        assert!(matches!(
            validate_config(&config),
            Err(FundamentalsError::ConfigInvalid { key, .. }) if key == "backend"
        ));
    }

    #[test]
    fn sqlite_pool_size_bounds() {
        let config = MapConfig::new(&[
            ("store", "backend", "sqlite"),
            ("sqlite", "path", "f.db"),
            ("sqlite", "pool_size", "0"),
        ]);
        assert!(validate_config(&config).is_err());

        let config = MapConfig::new(&[("store", "backend", "SQLite"), ("sqlite", "path", "f.db")]);
        assert_eq!(validate_config(&config).unwrap(), StoreBackend::Sqlite);
    }

    #[test]
    fn postgres_accepts_either_connection_key() {
        let config = MapConfig::new(&[
            ("store", "backend", "postgres"),
            ("database", "conninfo", "host=localhost"),
        ]);
        assert_eq!(validate_config(&config).unwrap(), StoreBackend::Postgres);

        let config = MapConfig::new(&[("store", "backend", "postgres")]);
        assert!(matches!(
            validate_config(&config),
            Err(FundamentalsError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let config = MapConfig::new(&[("csv", "path", "d"), ("logging", "level", "loud")]);
        assert!(validate_config(&config).is_err());
        let config = MapConfig::new(&[("csv", "path", "d"), ("logging", "level", "DEBUG")]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_blank_registry_path() {
        let config = MapConfig::new(&[("csv", "path", "d"), ("registry", "path", "  ")]);
        assert!(validate_config(&config).is_err());
    }
}
