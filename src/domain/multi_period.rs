//! Multi-period field container.
//!
//! Aggregates one logical metric (say, three-month average revenue growth)
//! across its reporting periods. Every accessor is a stateless read through
//! the resolver; nothing is cached between calls.

use crate::domain::error::FundamentalsError;
use crate::domain::field_path::FieldPath;
use crate::domain::period::Period;
use crate::domain::registry::FieldDescriptor;
use crate::domain::resolver::FieldResolver;
use crate::domain::security::{PointInTime, SecurityIdentifier};
use crate::domain::value::FieldValue;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::marker::PhantomData;

/// Period → value map holding only reported (non-sentinel) values, in
/// canonical period order. Serializes as an object keyed by period tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PeriodValues<T>(BTreeMap<Period, T>);

impl<T: FieldValue> PeriodValues<T> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert unless `value` is the sentinel. Returns whether it was kept.
    pub fn insert(&mut self, period: Period, value: T) -> bool {
        if value.is_no_value() {
            return false;
        }
        self.0.insert(period, value);
        true
    }
}

impl<T: FieldValue> Default for PeriodValues<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PeriodValues<T> {
    pub fn get(&self, period: Period) -> Option<&T> {
        self.0.get(&period)
    }

    pub fn contains(&self, period: Period) -> bool {
        self.0.contains_key(&period)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Period, T> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<Period, T> {
        self.0
    }
}

impl<'v, T> IntoIterator for &'v PeriodValues<T> {
    type Item = (&'v Period, &'v T);
    type IntoIter = btree_map::Iter<'v, Period, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub struct MultiPeriodField<'a, T> {
    resolver: FieldResolver<'a>,
    time: PointInTime,
    security: SecurityIdentifier,
    base: FieldPath,
    periods: Vec<Period>,
    default_period: Period,
    _value: PhantomData<T>,
}

impl<'a, T: FieldValue> MultiPeriodField<'a, T> {
    /// `periods` are the windows the field is reported for; `default_period`
    /// backs [`MultiPeriodField::value`] and [`MultiPeriodField::has_value`].
    pub fn new(
        resolver: FieldResolver<'a>,
        time: PointInTime,
        security: &SecurityIdentifier,
        base: FieldPath,
        mut periods: Vec<Period>,
        default_period: Period,
    ) -> Self {
        periods.sort();
        periods.dedup();
        Self {
            resolver,
            time,
            security: security.clone(),
            base,
            periods,
            default_period,
            _value: PhantomData,
        }
    }

    pub fn from_descriptor(
        resolver: FieldResolver<'a>,
        time: PointInTime,
        security: &SecurityIdentifier,
        descriptor: &FieldDescriptor,
    ) -> Result<Self, FundamentalsError> {
        let default_period = match descriptor.default_period {
            Some(p) if descriptor.is_multi_period() => p,
            _ => {
                return Err(FundamentalsError::RegistryInvalid {
                    reason: format!("{} is not a multi-period field", descriptor.key),
                });
            }
        };
        Ok(Self::new(
            resolver,
            time,
            security,
            descriptor.key.clone(),
            descriptor.periods.clone(),
            default_period,
        ))
    }

    pub fn base_path(&self) -> &FieldPath {
        &self.base
    }

    pub fn default_period(&self) -> Period {
        self.default_period
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// One store read for `period`.
    pub fn period(&self, period: Period) -> Result<T, FundamentalsError> {
        self.resolver
            .get(self.time, &self.security, &self.base.with_period(period))
    }

    /// Resolve a caller-supplied label (`"3Y"`, `"ThreeYears"`) and read it.
    pub fn period_value(&self, label: &str) -> Result<T, FundamentalsError> {
        let period: Period = label.parse()?;
        self.period(period)
    }

    /// Default-period value; when that is unreported, the first reported
    /// value among the other periods in canonical order; else the sentinel.
    pub fn value(&self) -> Result<T, FundamentalsError> {
        let default = self.period(self.default_period)?;
        if !default.is_no_value() {
            return Ok(default);
        }
        for &p in self.periods.iter().filter(|&&p| p != self.default_period) {
            let v = self.period(p)?;
            if !v.is_no_value() {
                return Ok(v);
            }
        }
        Ok(T::no_value())
    }

    pub fn has_value(&self) -> Result<bool, FundamentalsError> {
        Ok(!self.period(self.default_period)?.is_no_value())
    }

    /// Every reported period. Unreported periods are left out.
    pub fn period_values(&self) -> Result<PeriodValues<T>, FundamentalsError> {
        let mut values = PeriodValues::new();
        for &p in &self.periods {
            values.insert(p, self.period(p)?);
        }
        Ok(values)
    }

    pub fn one_month(&self) -> Result<T, FundamentalsError> {
        self.period(Period::OneMonth)
    }

    pub fn two_months(&self) -> Result<T, FundamentalsError> {
        self.period(Period::TwoMonths)
    }

    pub fn three_months(&self) -> Result<T, FundamentalsError> {
        self.period(Period::ThreeMonths)
    }

    pub fn six_months(&self) -> Result<T, FundamentalsError> {
        self.period(Period::SixMonths)
    }

    pub fn nine_months(&self) -> Result<T, FundamentalsError> {
        self.period(Period::NineMonths)
    }

    pub fn twelve_months(&self) -> Result<T, FundamentalsError> {
        self.period(Period::TwelveMonths)
    }

    pub fn one_year(&self) -> Result<T, FundamentalsError> {
        self.period(Period::OneYear)
    }

    pub fn two_years(&self) -> Result<T, FundamentalsError> {
        self.period(Period::TwoYears)
    }

    pub fn three_years(&self) -> Result<T, FundamentalsError> {
        self.period(Period::ThreeYears)
    }

    pub fn five_years(&self) -> Result<T, FundamentalsError> {
        self.period(Period::FiveYears)
    }

    pub fn ten_years(&self) -> Result<T, FundamentalsError> {
        self.period(Period::TenYears)
    }
}
