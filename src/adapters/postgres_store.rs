//! PostgreSQL fundamental store.
//!
//! Expects `public.fundamentals(security text, path text, as_of date,
//! num_value double precision, text_value text)`; at most one of the two
//! value columns is non-null per row.

use crate::domain::error::FundamentalsError;
use crate::domain::field_path::FieldPath;
use crate::domain::security::{PointInTime, SecurityIdentifier};
use crate::domain::value::StoredValue;
use crate::ports::config_port::ConfigPort;
use crate::ports::fundamental_port::FundamentalStore;
use chrono::NaiveDate;
use postgres::{Client, NoTls};
use std::sync::Mutex;

pub struct PostgresFundamentalStore {
    client: Mutex<Client>,
}

impl PostgresFundamentalStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, FundamentalsError> {
        // [postgres] connection_string first, then [database] conninfo
        let connection_string = config
            .get_string("postgres", "connection_string")
            .or_else(|| config.get_string("database", "conninfo"))
            .ok_or_else(|| FundamentalsError::ConfigMissing {
                section: "postgres".into(),
                key: "connection_string".into(),
            })?;

        let client = Client::connect(&connection_string, NoTls)
            .map_err(|e| FundamentalsError::unavailable(format!("postgres: {}", e)))?;

        tracing::info!("connected to postgres fundamental store");
        Ok(Self {
            client: Mutex::new(client),
        })
    }

    fn with_client<R>(
        &self,
        f: impl FnOnce(&mut Client) -> Result<R, postgres::Error>,
    ) -> Result<R, FundamentalsError> {
        let mut client = self
            .client
            .lock()
            .map_err(|_| FundamentalsError::unavailable("postgres client lock poisoned"))?;
        f(&mut client).map_err(|e| FundamentalsError::unavailable(format!("postgres: {}", e)))
    }
}

impl FundamentalStore for PostgresFundamentalStore {
    fn lookup(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        path: &FieldPath,
    ) -> Result<Option<StoredValue>, FundamentalsError> {
        let query = "SELECT num_value, text_value \
                     FROM public.fundamentals \
                     WHERE security = $1 AND path = $2 AND as_of <= $3 \
                     ORDER BY as_of DESC \
                     LIMIT 1";

        let as_of: NaiveDate = time.date();
        let rows = self.with_client(|c| c.query(query, &[&security.as_str(), &path.as_str(), &as_of]))?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let num: Option<f64> = row.get(0);
        let text: Option<String> = row.get(1);
        Ok(match (num, text) {
            (Some(n), _) => Some(StoredValue::Number(n)),
            (None, Some(t)) => Some(StoredValue::infer(&t)),
            (None, None) => None,
        })
    }

    fn list_securities(&self) -> Result<Vec<SecurityIdentifier>, FundamentalsError> {
        let rows = self.with_client(|c| {
            c.query(
                "SELECT DISTINCT security FROM public.fundamentals ORDER BY security",
                &[],
            )
        })?;

        rows.iter()
            .map(|row| SecurityIdentifier::new(&row.get::<_, String>(0)))
            .collect()
    }
}
