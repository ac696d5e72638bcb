//! Dotted field paths such as `FinancialStatements.BalanceSheet.BSFileDate`.

use crate::domain::error::FundamentalsError;
use crate::domain::period::Period;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An immutable, validated dotted path into a financial statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// Validate and wrap a dotted path.
    ///
    /// Every segment must be non-empty, start with an ASCII letter and hold
    /// only ASCII alphanumerics or underscores.
    pub fn parse(input: &str) -> Result<Self, FundamentalsError> {
        let malformed = |reason: &str| FundamentalsError::MalformedPath {
            path: input.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(malformed("path is empty"));
        }

        for segment in input.split('.') {
            let mut chars = segment.chars();
            match chars.next() {
                None => return Err(malformed("empty segment")),
                Some(c) if !c.is_ascii_alphabetic() => {
                    return Err(malformed("segment must start with a letter"));
                }
                Some(_) => {}
            }
            if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(malformed("segment contains invalid characters"));
            }
        }

        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Last segment, e.g. `BSFileDate`.
    pub fn leaf(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Path of one period of a multi-period field, e.g.
    /// `OperationRatios.ROE.OneYear`.
    pub fn with_period(&self, period: Period) -> FieldPath {
        FieldPath(format!("{}.{}", self.0, period.path_suffix()))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FieldPath {
    type Err = FundamentalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_path() {
        let path = FieldPath::parse("FinancialStatements.BalanceSheet.BSFileDate").unwrap();
        assert_eq!(
            path.segments().collect::<Vec<_>>(),
            vec!["FinancialStatements", "BalanceSheet", "BSFileDate"]
        );
        assert_eq!(path.leaf(), "BSFileDate");
    }

    #[test]
    fn single_segment_is_valid() {
        assert!(FieldPath::parse("MarketCap").is_ok());
    }

    #[test]
    fn rejects_empty_and_empty_segments() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("A..B").is_err());
        assert!(FieldPath::parse(".A").is_err());
        assert!(FieldPath::parse("A.").is_err());
    }

    #[test]
    fn rejects_bad_characters() {
        let err = FieldPath::parse("OperationRatios.ROE-1").unwrap_err();
        assert!(matches!(err, FundamentalsError::MalformedPath { .. }));
        assert!(FieldPath::parse("OperationRatios.1Y").is_err());
        assert!(FieldPath::parse("Operation Ratios.ROE").is_err());
    }

    #[test]
    fn with_period_appends_suffix() {
        let base = FieldPath::parse("OperationRatios.OperationRevenueGrowth3MonthAvg").unwrap();
        assert_eq!(
            base.with_period(Period::OneYear).as_str(),
            "OperationRatios.OperationRevenueGrowth3MonthAvg.OneYear"
        );
        assert_eq!(
            base.with_period(Period::ThreeMonths).as_str(),
            "OperationRatios.OperationRevenueGrowth3MonthAvg.ThreeMonths"
        );
    }
}
