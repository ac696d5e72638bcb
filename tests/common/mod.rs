#![allow(dead_code)]

use chrono::NaiveDate;
use fundfields::domain::error::FundamentalsError;
use fundfields::domain::field_path::FieldPath;
use fundfields::domain::security::{PointInTime, SecurityIdentifier};
use fundfields::domain::value::StoredValue;
use fundfields::ports::fundamental_port::FundamentalStore;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Write;

pub const AAPL: &str = "AAPL R735QTJ8XC9X";
pub const GROWTH: &str = "OperationRatios.OperationRevenueGrowth3MonthAvg";

/// In-memory store keyed by (security, path). Ignores time.
pub struct MockFundamentalStore {
    pub values: HashMap<(String, String), StoredValue>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
    pub seen: RefCell<Vec<String>>,
}

impl MockFundamentalStore {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
            seen: RefCell::new(Vec::new()),
        }
    }

    pub fn with_value(mut self, security: &str, path: &str, value: StoredValue) -> Self {
        self.values
            .insert((security.to_string(), path.to_string()), value);
        self
    }

    pub fn with_number(self, security: &str, path: &str, value: f64) -> Self {
        self.with_value(security, path, StoredValue::Number(value))
    }

    /// Every lookup for `security` fails with `DataUnavailable`.
    pub fn with_error(mut self, security: &str, reason: &str) -> Self {
        self.errors.insert(security.to_string(), reason.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl FundamentalStore for MockFundamentalStore {
    fn lookup(
        &self,
        _time: PointInTime,
        security: &SecurityIdentifier,
        path: &FieldPath,
    ) -> Result<Option<StoredValue>, FundamentalsError> {
        self.calls.set(self.calls.get() + 1);
        self.seen.borrow_mut().push(path.to_string());
        if let Some(reason) = self.errors.get(security.as_str()) {
            return Err(FundamentalsError::unavailable(reason.clone()));
        }
        Ok(self
            .values
            .get(&(security.as_str().to_string(), path.as_str().to_string()))
            .cloned())
    }

    fn list_securities(&self) -> Result<Vec<SecurityIdentifier>, FundamentalsError> {
        let mut names: Vec<_> = self.values.keys().map(|(s, _)| s.clone()).collect();
        names.sort();
        names.dedup();
        names.iter().map(|s| SecurityIdentifier::new(s)).collect()
    }
}

pub fn at(date: &str) -> PointInTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(16, 0, 0)
        .unwrap()
}

pub fn security(id: &str) -> SecurityIdentifier {
    SecurityIdentifier::new(id).unwrap()
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// `<dir>/<file>` with a `date,path,value` header.
pub fn write_security_csv(dir: &std::path::Path, file: &str, rows: &[(&str, &str, &str)]) {
    let mut content = String::from("date,path,value\n");
    for (date, path, value) in rows {
        content.push_str(&format!("{},{},{}\n", date, path, value));
    }
    std::fs::write(dir.join(file), content).unwrap();
}
