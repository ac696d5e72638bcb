//! CSV directory fundamental store.
//!
//! One file per security, `<identifier>.csv`, with header
//! `date,path,value`. The identifier is percent-encoded in the file name
//! (`AAPL R735QTJ8XC9X` is stored as `AAPL%20R735QTJ8XC9X.csv`) and decoded
//! back when listing, so identifiers survive a round trip unchanged.

use crate::domain::error::FundamentalsError;
use crate::domain::field_path::FieldPath;
use crate::domain::record::{FundamentalRecord, latest_as_of};
use crate::domain::security::{PointInTime, SecurityIdentifier};
use crate::domain::value::StoredValue;
use crate::ports::config_port::ConfigPort;
use crate::ports::fundamental_port::FundamentalStore;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct CsvFundamentalStore {
    base_path: PathBuf,
}

impl CsvFundamentalStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, FundamentalsError> {
        let path = config
            .get_string("csv", "path")
            .ok_or_else(|| FundamentalsError::ConfigMissing {
                section: "csv".into(),
                key: "path".into(),
            })?;
        Ok(Self::new(PathBuf::from(path)))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn csv_path(&self, security: &SecurityIdentifier) -> PathBuf {
        self.base_path.join(file_name(security))
    }

    fn ensure_base_dir(&self) -> Result<(), FundamentalsError> {
        if self.base_path.is_dir() {
            Ok(())
        } else {
            Err(FundamentalsError::unavailable(format!(
                "fundamental data directory {} does not exist",
                self.base_path.display()
            )))
        }
    }

    /// All records for `security`, in file order. A missing file is an empty
    /// history, not an error.
    pub fn read_records(
        &self,
        security: &SecurityIdentifier,
    ) -> Result<Vec<FundamentalRecord>, FundamentalsError> {
        self.ensure_base_dir()?;

        let path = self.csv_path(security);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(FundamentalsError::unavailable(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut records = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let row = result.map_err(|e| {
                FundamentalsError::unavailable(format!("CSV parse error in {}: {}", path.display(), e))
            })?;
            let malformed = |what: &str| {
                FundamentalsError::unavailable(format!(
                    "{} row {}: {}",
                    path.display(),
                    line + 2,
                    what
                ))
            };

            let date_str = row.get(0).ok_or_else(|| malformed("missing date column"))?;
            let as_of = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| malformed(&format!("invalid date: {}", e)))?;

            let path_str = row.get(1).ok_or_else(|| malformed("missing path column"))?;
            let field_path = FieldPath::parse(path_str.trim())
                .map_err(|e| malformed(&e.to_string()))?;

            let value_str = row.get(2).ok_or_else(|| malformed("missing value column"))?;
            let value = if value_str.trim().is_empty() {
                None
            } else {
                Some(StoredValue::infer(value_str))
            };

            records.push(FundamentalRecord {
                security: security.clone(),
                path: field_path,
                as_of,
                value,
            });
        }

        Ok(records)
    }
}

/// File name holding `security`'s history.
pub fn file_name(security: &SecurityIdentifier) -> String {
    format!("{}.csv", urlencoding::encode(security.as_str()))
}

fn decode_stem(stem: &str) -> Result<SecurityIdentifier, FundamentalsError> {
    let decoded = urlencoding::decode(stem).map_err(|e| {
        FundamentalsError::unavailable(format!("undecodable file name {}.csv: {}", stem, e))
    })?;
    SecurityIdentifier::new(&decoded)
}

impl FundamentalStore for CsvFundamentalStore {
    fn lookup(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        path: &FieldPath,
    ) -> Result<Option<StoredValue>, FundamentalsError> {
        let records = self.read_records(security)?;
        Ok(latest_as_of(&records, path, time.date()).and_then(|r| r.value.clone()))
    }

    fn list_securities(&self) -> Result<Vec<SecurityIdentifier>, FundamentalsError> {
        self.ensure_base_dir()?;
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            FundamentalsError::unavailable(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut securities = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                FundamentalsError::unavailable(format!("directory entry error: {}", e))
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                securities.push(decode_stem(stem)?);
            }
        }

        securities.sort();
        Ok(securities)
    }
}
