//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Config with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[store]
backend = sqlite

[sqlite]
path = /var/lib/fundfields/fundamentals.db
pool_size = 8

[registry]
path = /etc/fundfields/fields.csv

[logging]
level = debug
json = off
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("store", "backend"),
            Some("sqlite".to_string())
        );
        assert_eq!(
            adapter.get_string("registry", "path"),
            Some("/etc/fundfields/fields.csv".to_string())
        );
        assert!(adapter.has("sqlite", "path"));
        assert!(!adapter.has("csv", "path"));
    }

    #[test]
    fn get_int_value_and_defaults() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 8);
        assert_eq!(adapter.get_int("sqlite", "missing", 4), 4);

        let adapter = FileConfigAdapter::from_string("[sqlite]\npool_size = many\n").unwrap();
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 4);
    }

    #[test]
    fn get_bool_values() {
        let adapter =
            FileConfigAdapter::from_string("[logging]\na = true\nb = yes\nc = off\nd = 0\n")
                .unwrap();
        assert!(adapter.get_bool("logging", "a", false));
        assert!(adapter.get_bool("logging", "b", false));
        assert!(!adapter.get_bool("logging", "c", true));
        assert!(!adapter.get_bool("logging", "d", true));
        assert!(adapter.get_bool("logging", "missing", true));
    }

    #[test]
    fn empty_config_has_nothing() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("store", "backend"), None);
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 4);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[csv]\npath = /data/fundamentals\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("csv", "path"),
            Some("/data/fundamentals".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        assert!(FileConfigAdapter::from_file("/nonexistent/path/config.ini").is_err());
    }
}
