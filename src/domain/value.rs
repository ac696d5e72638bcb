//! Stored values, typed field values and their "no value" sentinels.

use crate::domain::error::FundamentalsError;
use crate::domain::field_path::FieldPath;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw value as handed back by a fundamental store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Number(f64),
    Integer(i64),
    Date(NaiveDate),
    Text(String),
}

impl StoredValue {
    pub fn kind(&self) -> &'static str {
        match self {
            StoredValue::Number(_) => "number",
            StoredValue::Integer(_) => "integer",
            StoredValue::Date(_) => "date",
            StoredValue::Text(_) => "text",
        }
    }

    /// Infer a typed value from its textual form: integer, then float, then
    /// `YYYY-MM-DD` date, otherwise text.
    pub fn infer(raw: &str) -> StoredValue {
        let s = raw.trim();
        if let Ok(i) = s.parse::<i64>() {
            return StoredValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return StoredValue::Number(f);
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return StoredValue::Date(d);
        }
        StoredValue::Text(s.to_string())
    }

    /// Textual form understood by [`StoredValue::infer`].
    pub fn to_text(&self) -> String {
        match self {
            StoredValue::Number(f) => f.to_string(),
            StoredValue::Integer(i) => i.to_string(),
            StoredValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            StoredValue::Text(t) => t.clone(),
        }
    }
}

/// Declared value type of a field in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Double,
    Integer,
    Date,
    Text,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Double => "double",
            FieldType::Integer => "integer",
            FieldType::Date => "date",
            FieldType::Text => "text",
        };
        f.write_str(name)
    }
}

impl FromStr for FieldType {
    type Err = FundamentalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "double" | "decimal" | "number" => Ok(FieldType::Double),
            "integer" | "int" => Ok(FieldType::Integer),
            "date" | "datetime" => Ok(FieldType::Date),
            "text" | "string" => Ok(FieldType::Text),
            other => Err(FundamentalsError::RegistryInvalid {
                reason: format!("unknown field type '{}'", other),
            }),
        }
    }
}

/// A field value type with a distinct "not reported" sentinel.
///
/// Sentinels: `f64::NAN`, `i64::MIN`, `NaiveDate::MIN`, and the empty string.
pub trait FieldValue: Sized + Clone + fmt::Debug {
    const FIELD_TYPE: FieldType;

    fn no_value() -> Self;

    fn is_no_value(&self) -> bool;

    /// Cast or parse a stored value. Values that cannot represent `Self` are
    /// a [`FundamentalsError::TypeMismatch`].
    fn from_stored(raw: StoredValue, path: &FieldPath) -> Result<Self, FundamentalsError>;
}

fn mismatch(path: &FieldPath, expected: FieldType, raw: &StoredValue) -> FundamentalsError {
    FundamentalsError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        found: format!("{} ({})", raw.kind(), raw.to_text()),
    }
}

impl FieldValue for f64 {
    const FIELD_TYPE: FieldType = FieldType::Double;

    fn no_value() -> Self {
        f64::NAN
    }

    fn is_no_value(&self) -> bool {
        self.is_nan()
    }

    fn from_stored(raw: StoredValue, path: &FieldPath) -> Result<Self, FundamentalsError> {
        match raw {
            StoredValue::Number(f) => Ok(f),
            StoredValue::Integer(i) => Ok(i as f64),
            StoredValue::Text(ref t) => t
                .trim()
                .parse::<f64>()
                .map_err(|_| mismatch(path, Self::FIELD_TYPE, &raw)),
            StoredValue::Date(_) => Err(mismatch(path, Self::FIELD_TYPE, &raw)),
        }
    }
}

impl FieldValue for i64 {
    const FIELD_TYPE: FieldType = FieldType::Integer;

    fn no_value() -> Self {
        i64::MIN
    }

    fn is_no_value(&self) -> bool {
        *self == i64::MIN
    }

    fn from_stored(raw: StoredValue, path: &FieldPath) -> Result<Self, FundamentalsError> {
        match raw {
            // i64::MIN is the sentinel and cannot be a reported value
            StoredValue::Integer(i) if i != i64::MIN => Ok(i),
            StoredValue::Number(f) if f.is_nan() => Ok(Self::no_value()),
            StoredValue::Number(f)
                if f.fract() == 0.0 && f > i64::MIN as f64 && f < i64::MAX as f64 =>
            {
                Ok(f as i64)
            }
            StoredValue::Text(ref t) => t
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|i| *i != i64::MIN)
                .ok_or_else(|| mismatch(path, Self::FIELD_TYPE, &raw)),
            _ => Err(mismatch(path, Self::FIELD_TYPE, &raw)),
        }
    }
}

impl FieldValue for NaiveDate {
    const FIELD_TYPE: FieldType = FieldType::Date;

    fn no_value() -> Self {
        NaiveDate::MIN
    }

    fn is_no_value(&self) -> bool {
        *self == NaiveDate::MIN
    }

    fn from_stored(raw: StoredValue, path: &FieldPath) -> Result<Self, FundamentalsError> {
        match raw {
            StoredValue::Date(d) => Ok(d),
            StoredValue::Text(ref t) => NaiveDate::parse_from_str(t.trim(), "%Y-%m-%d")
                .map_err(|_| mismatch(path, Self::FIELD_TYPE, &raw)),
            _ => Err(mismatch(path, Self::FIELD_TYPE, &raw)),
        }
    }
}

impl FieldValue for String {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn no_value() -> Self {
        String::new()
    }

    fn is_no_value(&self) -> bool {
        self.is_empty()
    }

    fn from_stored(raw: StoredValue, _path: &FieldPath) -> Result<Self, FundamentalsError> {
        Ok(match raw {
            StoredValue::Text(t) => t,
            other => other.to_text(),
        })
    }
}

/// A resolved value whose type is only known at runtime, from the registry.
/// Serializes to a plain JSON scalar, with `null` for "no value".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DynamicValue {
    Double(f64),
    Integer(i64),
    Date(NaiveDate),
    Text(String),
    None,
}

impl DynamicValue {
    pub fn is_none(&self) -> bool {
        matches!(self, DynamicValue::None)
    }

    pub(crate) fn from_double(v: f64) -> Self {
        if v.is_no_value() { Self::None } else { Self::Double(v) }
    }

    pub(crate) fn from_integer(v: i64) -> Self {
        if v.is_no_value() { Self::None } else { Self::Integer(v) }
    }

    pub(crate) fn from_date(v: NaiveDate) -> Self {
        if v.is_no_value() { Self::None } else { Self::Date(v) }
    }

    pub(crate) fn from_text(v: String) -> Self {
        if v.is_no_value() { Self::None } else { Self::Text(v) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> FieldPath {
        FieldPath::parse("OperationRatios.ROE.OneYear").unwrap()
    }

    #[test]
    fn infer_picks_narrowest_type() {
        assert_eq!(StoredValue::infer("42"), StoredValue::Integer(42));
        assert_eq!(StoredValue::infer("0.042"), StoredValue::Number(0.042));
        assert_eq!(
            StoredValue::infer("2024-03-31"),
            StoredValue::Date(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
        );
        assert_eq!(StoredValue::infer("USD"), StoredValue::Text("USD".into()));
    }

    #[test]
    fn sentinels_are_recognised() {
        assert!(f64::no_value().is_no_value());
        assert!(i64::no_value().is_no_value());
        assert!(NaiveDate::no_value().is_no_value());
        assert!(String::no_value().is_no_value());
        assert!(!0.0f64.is_no_value());
        assert!(!0i64.is_no_value());
    }

    #[test]
    fn double_casts_from_integer_and_text() {
        assert_eq!(f64::from_stored(StoredValue::Integer(3), &path()).unwrap(), 3.0);
        assert_eq!(
            f64::from_stored(StoredValue::Text(" 0.5 ".into()), &path()).unwrap(),
            0.5
        );
    }

    #[test]
    fn double_rejects_date() {
        let raw = StoredValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let err = f64::from_stored(raw, &path()).unwrap_err();
        assert!(matches!(err, FundamentalsError::TypeMismatch { expected, .. } if expected == "double"));
    }

    #[test]
    fn integer_accepts_integral_numbers_only() {
        assert_eq!(i64::from_stored(StoredValue::Number(12.0), &path()).unwrap(), 12);
        assert!(i64::from_stored(StoredValue::Number(12.5), &path()).is_err());
    }

    #[test]
    fn integer_sentinel_is_never_a_reported_value() {
        for raw in [
            StoredValue::Number(-9.223372036854776e18),
            StoredValue::Integer(i64::MIN),
            StoredValue::Text(i64::MIN.to_string()),
        ] {
            let err = i64::from_stored(raw, &path()).unwrap_err();
            assert!(matches!(err, FundamentalsError::TypeMismatch { .. }));
        }
        assert_eq!(
            i64::from_stored(StoredValue::Integer(i64::MIN + 1), &path()).unwrap(),
            i64::MIN + 1
        );
    }

    #[test]
    fn date_parses_text() {
        let d = NaiveDate::from_stored(StoredValue::Text("2023-12-31".into()), &path()).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert!(NaiveDate::from_stored(StoredValue::Number(1.0), &path()).is_err());
    }

    #[test]
    fn text_accepts_anything() {
        assert_eq!(
            String::from_stored(StoredValue::Integer(7), &path()).unwrap(),
            "7"
        );
    }

    #[test]
    fn dynamic_value_serializes_as_scalar() {
        assert_eq!(serde_json::to_string(&DynamicValue::Double(0.25)).unwrap(), "0.25");
        assert_eq!(serde_json::to_string(&DynamicValue::None).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&DynamicValue::from_date(
                NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
            ))
            .unwrap(),
            "\"2024-03-31\""
        );
        assert!(DynamicValue::from_double(f64::NAN).is_none());
    }

    #[test]
    fn field_type_parses_aliases() {
        assert_eq!("Decimal".parse::<FieldType>().unwrap(), FieldType::Double);
        assert_eq!("datetime".parse::<FieldType>().unwrap(), FieldType::Date);
        assert!("blob".parse::<FieldType>().is_err());
    }
}
