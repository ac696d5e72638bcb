//! Field registry loaded from CSV.
//!
//! Header: `key,data_id,type,periods,default_period`. `periods` is a
//! `|`-separated list of period tags; both it and `default_period` may be
//! blank for single-valued fields.

use crate::domain::error::FundamentalsError;
use crate::domain::field_path::FieldPath;
use crate::domain::period::{Period, parse_periods};
use crate::domain::registry::{FieldDescriptor, FieldRegistry};
use crate::domain::value::FieldType;
use std::fs;
use std::path::Path;

pub fn load_registry<P: AsRef<Path>>(path: P) -> Result<FieldRegistry, FundamentalsError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| FundamentalsError::RegistryInvalid {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    let registry = parse_registry(&content)?;
    tracing::info!(path = %path.display(), fields = registry.len(), "loaded field registry");
    Ok(registry)
}

pub fn parse_registry(content: &str) -> Result<FieldRegistry, FundamentalsError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let mut registry = FieldRegistry::default();

    for result in rdr.records() {
        let row = result.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line());
            FundamentalsError::RegistryInvalid {
                reason: format!("row {}: {}", line, e),
            }
        })?;
        let line = row.position().map_or(0, |p| p.line());
        let invalid = |what: String| FundamentalsError::RegistryInvalid {
            reason: format!("row {}: {}", line, what),
        };

        let key = row.get(0).ok_or_else(|| invalid("missing key".into()))?;
        let key = FieldPath::parse(key).map_err(|e| invalid(e.to_string()))?;

        let data_id: u32 = row
            .get(1)
            .ok_or_else(|| invalid("missing data_id".into()))?
            .parse()
            .map_err(|e| invalid(format!("invalid data_id: {}", e)))?;

        let value_type: FieldType = row
            .get(2)
            .ok_or_else(|| invalid("missing type".into()))?
            .parse()
            .map_err(|e: FundamentalsError| invalid(e.to_string()))?;

        let periods = parse_periods(row.get(3).unwrap_or(""))
            .map_err(|e| invalid(e.to_string()))?;

        let descriptor = match row.get(4).filter(|s| !s.is_empty()) {
            Some(label) => {
                let default_period: Period =
                    label.parse().map_err(|e: FundamentalsError| invalid(e.to_string()))?;
                FieldDescriptor {
                    key,
                    data_id,
                    value_type,
                    periods,
                    default_period: Some(default_period),
                }
            }
            None if periods.is_empty() => FieldDescriptor::single(key, data_id, value_type),
            None => FieldDescriptor::multi_period(key, data_id, value_type, periods),
        };

        registry
            .insert(descriptor)
            .map_err(|e| invalid(e.to_string()))?;
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
key,data_id,type,periods,default_period
# balance sheet
FinancialStatements.BalanceSheet.BSFileDate,23542,date,,
OperationRatios.OperationRevenueGrowth3MonthAvg,10001,double,1Y|3Y|5Y,
FinancialStatements.BalanceSheet.TotalAssets,23645,double,3M|12M,12M
";

    #[test]
    fn parses_single_and_multi_period_rows() {
        let registry = parse_registry(SAMPLE).unwrap();
        assert_eq!(registry.len(), 3);

        let file_date = registry.by_data_id(23542).unwrap();
        assert!(!file_date.is_multi_period());
        assert_eq!(file_date.value_type, FieldType::Date);

        let growth = registry
            .get("OperationRatios.OperationRevenueGrowth3MonthAvg")
            .unwrap();
        assert_eq!(growth.default_period, Some(Period::OneYear));
        assert_eq!(growth.periods.len(), 3);

        let assets = registry.by_data_id(23645).unwrap();
        assert_eq!(assets.default_period, Some(Period::TwelveMonths));
    }

    #[test]
    fn reports_row_of_bad_type() {
        let content = "key,data_id,type,periods,default_period\nA.B,1,blob,,\n";
        let err = parse_registry(content).unwrap_err();
        assert!(matches!(err, FundamentalsError::RegistryInvalid { reason } if reason.starts_with("row 2")));
    }

    #[test]
    fn row_numbers_count_comment_lines() {
        let content = "\
key,data_id,type,periods,default_period
# valuation
# more notes
ValuationRatios.PERatio,14000,double,,
ValuationRatios.PBRatio,14001,blob,,
";
        let err = parse_registry(content).unwrap_err();
        assert!(matches!(err, FundamentalsError::RegistryInvalid { reason } if reason.starts_with("row 5:")));
    }

    #[test]
    fn rejects_bad_period_and_default_outside_periods() {
        let bad_period = "key,data_id,type,periods,default_period\nA.B,1,double,1Y|7Y,\n";
        assert!(parse_registry(bad_period).is_err());

        let bad_default = "key,data_id,type,periods,default_period\nA.B,1,double,1Y|3Y,5Y\n";
        assert!(parse_registry(bad_default).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let content = "key,data_id,type,periods,default_period\nA.B,1,double,,\nA.C,1,double,,\n";
        assert!(parse_registry(content).is_err());
    }

    #[test]
    fn load_registry_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let registry = load_registry(file.path()).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(load_registry("/nonexistent/fields.csv").is_err());
    }
}
