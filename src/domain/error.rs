//! Domain error types.
//!
//! Absence of a field value is never an error: it is the field type's
//! sentinel. Everything here is a genuine failure the caller must see.

/// Top-level error type for fundfields.
#[derive(Debug, thiserror::Error)]
pub enum FundamentalsError {
    #[error("data unavailable: {reason}")]
    DataUnavailable { reason: String },

    #[error("malformed field path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("type mismatch for {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("unknown field: {key}")]
    UnknownField { key: String },

    #[error("unknown period: {label}")]
    UnknownPeriod { label: String },

    #[error("invalid field registry: {reason}")]
    RegistryInvalid { reason: String },

    #[error("invalid security identifier: {reason}")]
    InvalidSecurity { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FundamentalsError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            reason: reason.into(),
        }
    }

    /// True when the backing store itself failed, as opposed to the request
    /// being malformed.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. })
    }
}

impl From<&FundamentalsError> for std::process::ExitCode {
    fn from(err: &FundamentalsError) -> Self {
        let code: u8 = match err {
            FundamentalsError::Io(_) => 1,
            FundamentalsError::ConfigParse { .. }
            | FundamentalsError::ConfigMissing { .. }
            | FundamentalsError::ConfigInvalid { .. } => 2,
            FundamentalsError::DataUnavailable { .. } => 3,
            FundamentalsError::MalformedPath { .. }
            | FundamentalsError::TypeMismatch { .. }
            | FundamentalsError::UnknownField { .. }
            | FundamentalsError::UnknownPeriod { .. }
            | FundamentalsError::RegistryInvalid { .. }
            | FundamentalsError::InvalidSecurity { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_flagged() {
        let err = FundamentalsError::unavailable("connection refused");
        assert!(err.is_data_unavailable());
        assert_eq!(err.to_string(), "data unavailable: connection refused");
    }

    #[test]
    fn resolution_errors_are_not_unavailable() {
        let err = FundamentalsError::UnknownPeriod {
            label: "7Y".into(),
        };
        assert!(!err.is_data_unavailable());
        assert_eq!(err.to_string(), "unknown period: 7Y");
    }
}
