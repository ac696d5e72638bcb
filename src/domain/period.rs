//! Reporting periods for multi-period fields.

use crate::domain::error::FundamentalsError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A reporting window. Variants are declared in canonical order, shortest
/// window first, so `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    OneMonth,
    TwoMonths,
    ThreeMonths,
    SixMonths,
    NineMonths,
    TwelveMonths,
    OneYear,
    TwoYears,
    ThreeYears,
    FiveYears,
    TenYears,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneMonth,
        Period::TwoMonths,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::NineMonths,
        Period::TwelveMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::ThreeYears,
        Period::FiveYears,
        Period::TenYears,
    ];

    /// Short serialization tag, e.g. `"1Y"`.
    pub fn tag(self) -> &'static str {
        match self {
            Period::OneMonth => "1M",
            Period::TwoMonths => "2M",
            Period::ThreeMonths => "3M",
            Period::SixMonths => "6M",
            Period::NineMonths => "9M",
            Period::TwelveMonths => "12M",
            Period::OneYear => "1Y",
            Period::TwoYears => "2Y",
            Period::ThreeYears => "3Y",
            Period::FiveYears => "5Y",
            Period::TenYears => "10Y",
        }
    }

    /// Final segment appended to a field path, e.g. `"OneYear"`.
    pub fn path_suffix(self) -> &'static str {
        match self {
            Period::OneMonth => "OneMonth",
            Period::TwoMonths => "TwoMonths",
            Period::ThreeMonths => "ThreeMonths",
            Period::SixMonths => "SixMonths",
            Period::NineMonths => "NineMonths",
            Period::TwelveMonths => "TwelveMonths",
            Period::OneYear => "OneYear",
            Period::TwoYears => "TwoYears",
            Period::ThreeYears => "ThreeYears",
            Period::FiveYears => "FiveYears",
            Period::TenYears => "TenYears",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Period {
    type Err = FundamentalsError;

    /// Accepts the tag (`"3Y"`) or the suffix name (`"ThreeYears"`),
    /// ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Period::ALL
            .iter()
            .copied()
            .find(|p| {
                p.tag().eq_ignore_ascii_case(trimmed)
                    || p.path_suffix().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| FundamentalsError::UnknownPeriod {
                label: s.to_string(),
            })
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a `|`-separated period list such as `"1Y|3Y|5Y"`.
pub fn parse_periods(input: &str) -> Result<Vec<Period>, FundamentalsError> {
    let mut periods = Vec::new();
    for token in input.split('|') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        let period: Period = trimmed.parse()?;
        if !periods.contains(&period) {
            periods.push(period);
        }
    }
    periods.sort();
    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_and_names() {
        assert_eq!("1Y".parse::<Period>().unwrap(), Period::OneYear);
        assert_eq!("12m".parse::<Period>().unwrap(), Period::TwelveMonths);
        assert_eq!("ThreeYears".parse::<Period>().unwrap(), Period::ThreeYears);
        assert_eq!(" tenyears ".parse::<Period>().unwrap(), Period::TenYears);
    }

    #[test]
    fn rejects_unknown_label() {
        let err = "7Y".parse::<Period>().unwrap_err();
        assert!(matches!(err, FundamentalsError::UnknownPeriod { label } if label == "7Y"));
    }

    #[test]
    fn tags_and_suffixes_are_unique() {
        for (i, a) in Period::ALL.iter().enumerate() {
            for b in &Period::ALL[i + 1..] {
                assert_ne!(a.tag(), b.tag());
                assert_ne!(a.path_suffix(), b.path_suffix());
            }
        }
    }

    #[test]
    fn canonical_order_matches_all() {
        let mut sorted = Period::ALL;
        sorted.sort();
        assert_eq!(sorted, Period::ALL);
    }

    #[test]
    fn serializes_as_tag() {
        let json = serde_json::to_string(&Period::FiveYears).unwrap();
        assert_eq!(json, "\"5Y\"");
        let back: Period = serde_json::from_str("\"OneMonth\"").unwrap();
        assert_eq!(back, Period::OneMonth);
    }

    #[test]
    fn parse_periods_sorts_and_dedups() {
        let periods = parse_periods("5Y|1Y|3Y|1Y").unwrap();
        assert_eq!(
            periods,
            vec![Period::OneYear, Period::ThreeYears, Period::FiveYears]
        );
        assert!(parse_periods("").unwrap().is_empty());
        assert!(parse_periods("1Y|bogus").is_err());
    }
}
