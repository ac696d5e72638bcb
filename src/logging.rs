//! Logging setup for the binary.

use crate::ports::config_port::ConfigPort;
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub level: Level,
    pub compact: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            compact: false,
        }
    }
}

impl LogSettings {
    /// `[logging] level` and `[logging] compact`, then raised one level per
    /// `verbosity` step.
    pub fn from_config(config: &dyn ConfigPort, verbosity: u8) -> Self {
        let base = config
            .get_string("logging", "level")
            .and_then(|l| parse_level(&l))
            .unwrap_or(Level::WARN);
        Self {
            level: raise(base, verbosity),
            compact: config.get_bool("logging", "compact", false),
        }
    }
}

pub fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

fn raise(level: Level, steps: u8) -> Level {
    const ORDER: [Level; 5] = [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE];
    let start = ORDER.iter().position(|l| *l == level).unwrap_or(1);
    ORDER[(start + steps as usize).min(ORDER.len() - 1)]
}

/// Install the global subscriber, writing to stderr so stdout stays clean
/// for JSON output. A second call is a no-op.
pub fn init(settings: LogSettings) {
    let builder = tracing_subscriber::fmt()
        .with_max_level(settings.level)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if settings.compact {
        builder.compact().try_init()
    } else {
        builder.try_init()
    };

    if result.is_ok() {
        tracing::debug!(level = %settings.level, "logging initialised");
    }
}
