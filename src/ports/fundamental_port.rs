//! Fundamental data store port.

use crate::domain::error::FundamentalsError;
use crate::domain::field_path::FieldPath;
use crate::domain::security::{PointInTime, SecurityIdentifier};
use crate::domain::value::StoredValue;

/// Backing store for fundamental data.
///
/// `Ok(None)` means the store has no value for the path as of `time`; the
/// resolver turns that into the field type's sentinel. `Err` is reserved for
/// a store that is unreachable, misconfigured or holding corrupt data.
pub trait FundamentalStore {
    fn lookup(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        path: &FieldPath,
    ) -> Result<Option<StoredValue>, FundamentalsError>;

    /// Securities this store holds any data for, sorted.
    fn list_securities(&self) -> Result<Vec<SecurityIdentifier>, FundamentalsError>;
}

impl<S: FundamentalStore + ?Sized> FundamentalStore for &S {
    fn lookup(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        path: &FieldPath,
    ) -> Result<Option<StoredValue>, FundamentalsError> {
        (**self).lookup(time, security, path)
    }

    fn list_securities(&self) -> Result<Vec<SecurityIdentifier>, FundamentalsError> {
        (**self).list_securities()
    }
}

impl<S: FundamentalStore + ?Sized> FundamentalStore for Box<S> {
    fn lookup(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        path: &FieldPath,
    ) -> Result<Option<StoredValue>, FundamentalsError> {
        (**self).lookup(time, security, path)
    }

    fn list_securities(&self) -> Result<Vec<SecurityIdentifier>, FundamentalsError> {
        (**self).list_securities()
    }
}
