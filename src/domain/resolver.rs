//! Field resolver facade.
//!
//! Translates a (time, security, path) triple into a typed value with exactly
//! one call into the injected [`FundamentalStore`]. No caching, no retries.

use crate::domain::error::FundamentalsError;
use crate::domain::field_path::FieldPath;
use crate::domain::multi_period::MultiPeriodField;
use crate::domain::period::Period;
use crate::domain::registry::FieldDescriptor;
use crate::domain::security::{PointInTime, SecurityIdentifier};
use crate::domain::value::{DynamicValue, FieldType, FieldValue};
use crate::ports::fundamental_port::FundamentalStore;
use chrono::NaiveDate;

#[derive(Clone, Copy)]
pub struct FieldResolver<'a> {
    store: &'a dyn FundamentalStore,
}

impl<'a> FieldResolver<'a> {
    pub fn new(store: &'a dyn FundamentalStore) -> Self {
        Self { store }
    }

    /// Resolve `path` for `security` as of `time`.
    ///
    /// A missing value yields `T::no_value()`. Store failures propagate.
    pub fn get<T: FieldValue>(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        path: &FieldPath,
    ) -> Result<T, FundamentalsError> {
        let raw = match self.store.lookup(time, security, path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(%security, %path, "fundamental lookup failed: {e}");
                return Err(e);
            }
        };
        tracing::debug!(%security, %path, %time, found = raw.is_some(), "fundamental lookup");
        match raw {
            Some(value) => T::from_stored(value, path),
            None => Ok(T::no_value()),
        }
    }

    /// Like [`FieldResolver::get`] but takes an unvalidated dotted path.
    pub fn get_path<T: FieldValue>(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        path: &str,
    ) -> Result<T, FundamentalsError> {
        let path = FieldPath::parse(path)?;
        self.get(time, security, &path)
    }

    /// Resolve a registry field. `None` selects the default period of a
    /// multi-period field, or the field itself for a single-valued one.
    pub fn get_field<T: FieldValue>(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        descriptor: &FieldDescriptor,
        period: Option<Period>,
    ) -> Result<T, FundamentalsError> {
        if T::FIELD_TYPE != descriptor.value_type {
            return Err(FundamentalsError::TypeMismatch {
                path: descriptor.key.to_string(),
                expected: descriptor.value_type.to_string(),
                found: T::FIELD_TYPE.to_string(),
            });
        }
        let period = checked_period(descriptor, period)?;
        self.get(time, security, &descriptor.path(period))
    }

    /// Multi-period container for a registry field.
    pub fn multi_period<T: FieldValue>(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        descriptor: &FieldDescriptor,
    ) -> Result<MultiPeriodField<'a, T>, FundamentalsError> {
        if T::FIELD_TYPE != descriptor.value_type {
            return Err(FundamentalsError::TypeMismatch {
                path: descriptor.key.to_string(),
                expected: descriptor.value_type.to_string(),
                found: T::FIELD_TYPE.to_string(),
            });
        }
        MultiPeriodField::from_descriptor(*self, time, security, descriptor)
    }

    /// Resolve a registry field to a value typed by the registry.
    pub fn resolve_dynamic(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        descriptor: &FieldDescriptor,
        period: Option<Period>,
    ) -> Result<DynamicValue, FundamentalsError> {
        let period = checked_period(descriptor, period)?;
        let path = descriptor.path(period);
        Ok(match descriptor.value_type {
            FieldType::Double => DynamicValue::from_double(self.get(time, security, &path)?),
            FieldType::Integer => DynamicValue::from_integer(self.get(time, security, &path)?),
            FieldType::Date => {
                DynamicValue::from_date(self.get::<NaiveDate>(time, security, &path)?)
            }
            FieldType::Text => DynamicValue::from_text(self.get(time, security, &path)?),
        })
    }
}

fn checked_period(
    descriptor: &FieldDescriptor,
    period: Option<Period>,
) -> Result<Option<Period>, FundamentalsError> {
    match period {
        None => Ok(descriptor.default_period),
        Some(p) if descriptor.supports(p) => Ok(Some(p)),
        Some(p) => Err(FundamentalsError::UnknownPeriod {
            label: format!("{} for {}", p, descriptor.key),
        }),
    }
}
