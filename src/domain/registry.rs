//! Field descriptor registry.
//!
//! One descriptor per logical field replaces a generated type per field: the
//! descriptor carries the path template, value type, vendor DataId and the
//! periods a multi-period field is reported for.

use crate::domain::error::FundamentalsError;
use crate::domain::field_path::FieldPath;
use crate::domain::period::Period;
use crate::domain::value::FieldType;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub key: FieldPath,
    pub data_id: u32,
    pub value_type: FieldType,
    /// Empty for single-valued fields.
    pub periods: Vec<Period>,
    pub default_period: Option<Period>,
}

impl FieldDescriptor {
    pub fn single(key: FieldPath, data_id: u32, value_type: FieldType) -> Self {
        Self {
            key,
            data_id,
            value_type,
            periods: Vec::new(),
            default_period: None,
        }
    }

    /// Multi-period descriptor with `OneYear` as default when it is among
    /// `periods`, otherwise the first period.
    pub fn multi_period(
        key: FieldPath,
        data_id: u32,
        value_type: FieldType,
        mut periods: Vec<Period>,
    ) -> Self {
        periods.sort();
        periods.dedup();
        let default_period = if periods.contains(&Period::OneYear) {
            Some(Period::OneYear)
        } else {
            periods.first().copied()
        };
        Self {
            key,
            data_id,
            value_type,
            periods,
            default_period,
        }
    }

    pub fn is_multi_period(&self) -> bool {
        !self.periods.is_empty()
    }

    pub fn supports(&self, period: Period) -> bool {
        self.periods.contains(&period)
    }

    /// Concrete store path: the key itself, or the key plus period suffix.
    pub fn path(&self, period: Option<Period>) -> FieldPath {
        match period {
            Some(p) => self.key.with_period(p),
            None => self.key.clone(),
        }
    }

    /// Short key used when emitting the field, e.g. `"23542"`.
    pub fn serialization_key(&self) -> String {
        self.data_id.to_string()
    }

    fn validate(&self) -> Result<(), FundamentalsError> {
        match (self.periods.is_empty(), self.default_period) {
            (true, Some(p)) => Err(FundamentalsError::RegistryInvalid {
                reason: format!(
                    "{} is single-valued but declares default period {}",
                    self.key, p
                ),
            }),
            (false, None) => Err(FundamentalsError::RegistryInvalid {
                reason: format!("{} has periods but no default period", self.key),
            }),
            (false, Some(p)) if !self.supports(p) => Err(FundamentalsError::RegistryInvalid {
                reason: format!(
                    "{} default period {} is not among its periods",
                    self.key, p
                ),
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    by_key: BTreeMap<String, FieldDescriptor>,
    by_data_id: HashMap<u32, String>,
}

impl FieldRegistry {
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self, FundamentalsError>
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        let mut registry = FieldRegistry::default();
        for descriptor in descriptors {
            registry.insert(descriptor)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, descriptor: FieldDescriptor) -> Result<(), FundamentalsError> {
        descriptor.validate()?;
        let key = descriptor.key.as_str().to_string();
        if self.by_key.contains_key(&key) {
            return Err(FundamentalsError::RegistryInvalid {
                reason: format!("duplicate field key {}", key),
            });
        }
        if let Some(existing) = self.by_data_id.get(&descriptor.data_id) {
            return Err(FundamentalsError::RegistryInvalid {
                reason: format!(
                    "DataId {} used by both {} and {}",
                    descriptor.data_id, existing, key
                ),
            });
        }
        self.by_data_id.insert(descriptor.data_id, key.clone());
        self.by_key.insert(key, descriptor);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.by_key.get(key)
    }

    pub fn by_data_id(&self, data_id: u32) -> Option<&FieldDescriptor> {
        self.by_data_id.get(&data_id).and_then(|k| self.by_key.get(k))
    }

    /// Look up by field key, or by DataId when `key` is numeric.
    pub fn require(&self, key: &str) -> Result<&FieldDescriptor, FundamentalsError> {
        let trimmed = key.trim();
        let found = match trimmed.parse::<u32>() {
            Ok(id) => self.by_data_id(id),
            Err(_) => self.get(trimmed),
        };
        found.ok_or_else(|| FundamentalsError::UnknownField {
            key: key.to_string(),
        })
    }

    /// Descriptors sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.by_key.values()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Built-in catalogue of commonly used fields.
    pub fn builtin() -> Self {
        use FieldType::*;
        use Period::*;

        let single: &[(&str, u32, FieldType)] = &[
            ("FinancialStatements.BalanceSheet.BSFileDate", 23542, Date),
            ("FinancialStatements.BalanceSheet.PeriodEndingDate", 23001, Date),
            ("CompanyReference.CountryId", 1000, Text),
            ("CompanyReference.PrimaryExchangeID", 1001, Text),
            ("CompanyProfile.ShareClassLevelSharesOutstanding", 40000, Integer),
            ("CompanyProfile.MarketCap", 40001, Double),
            ("ValuationRatios.PERatio", 14000, Double),
            ("ValuationRatios.PBRatio", 14001, Double),
            ("ValuationRatios.DividendYield", 14002, Double),
        ];

        let multi: &[(&str, u32, FieldType, &[Period])] = &[
            (
                "FinancialStatements.BalanceSheet.TotalAssets",
                23645,
                Double,
                &[ThreeMonths, TwelveMonths],
            ),
            (
                "FinancialStatements.IncomeStatement.TotalRevenue",
                20001,
                Double,
                &[OneMonth, TwoMonths, ThreeMonths, SixMonths, NineMonths, TwelveMonths],
            ),
            (
                "FinancialStatements.IncomeStatement.NetIncome",
                20002,
                Double,
                &[ThreeMonths, SixMonths, NineMonths, TwelveMonths],
            ),
            (
                "OperationRatios.OperationRevenueGrowth3MonthAvg",
                10001,
                Double,
                &[OneYear, ThreeYears, FiveYears],
            ),
            ("OperationRatios.RevenueGrowth", 10002, Double, &[OneYear, ThreeYears, FiveYears, TenYears]),
            ("OperationRatios.ROE", 10003, Double, &[ThreeMonths, OneYear]),
            ("OperationRatios.ROA", 10004, Double, &[ThreeMonths, OneYear]),
            ("OperationRatios.GrossMargin", 10005, Double, &[ThreeMonths, OneYear]),
            ("EarningReports.BasicEPS", 30001, Double, &[ThreeMonths, SixMonths, NineMonths, TwelveMonths]),
            ("EarningReports.FileDate", 30002, Date, &[ThreeMonths, SixMonths, NineMonths, TwelveMonths]),
        ];

        let mut descriptors = Vec::with_capacity(single.len() + multi.len());
        for &(key, id, ty) in single {
            if let Ok(path) = FieldPath::parse(key) {
                descriptors.push(FieldDescriptor::single(path, id, ty));
            }
        }
        for &(key, id, ty, periods) in multi {
            if let Ok(path) = FieldPath::parse(key) {
                descriptors.push(FieldDescriptor::multi_period(path, id, ty, periods.to_vec()));
            }
        }

        let mut registry = FieldRegistry::default();
        for descriptor in descriptors {
            if let Err(e) = registry.insert(descriptor) {
                tracing::error!("built-in field registry entry rejected: {e}");
            }
        }
        registry
    }
}
