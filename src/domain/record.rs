//! A single reported fundamental value.

use crate::domain::field_path::FieldPath;
use crate::domain::security::SecurityIdentifier;
use crate::domain::value::StoredValue;
use chrono::NaiveDate;

/// One value of one field for one security, effective from `as_of`.
/// `value: None` records that the field stopped being reported.
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalRecord {
    pub security: SecurityIdentifier,
    pub path: FieldPath,
    pub as_of: NaiveDate,
    pub value: Option<StoredValue>,
}

/// Point-in-time selection: among `records` for `path`, the one with the
/// latest `as_of` not after `date`. Ties go to the later record.
pub fn latest_as_of<'r, I>(records: I, path: &FieldPath, date: NaiveDate) -> Option<&'r FundamentalRecord>
where
    I: IntoIterator<Item = &'r FundamentalRecord>,
{
    let mut best: Option<&FundamentalRecord> = None;
    for record in records {
        if &record.path != path || record.as_of > date {
            continue;
        }
        if best.is_none_or(|b| record.as_of >= b.as_of) {
            best = Some(record);
        }
    }
    best
}
