//! SQLite fundamental store.

use crate::domain::error::FundamentalsError;
use crate::domain::field_path::FieldPath;
use crate::domain::record::FundamentalRecord;
use crate::domain::security::{PointInTime, SecurityIdentifier};
use crate::domain::value::StoredValue;
use crate::ports::config_port::ConfigPort;
use crate::ports::fundamental_port::FundamentalStore;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use rusqlite::types::Value;

pub struct SqliteFundamentalStore {
    pool: Pool<SqliteConnectionManager>,
}

fn db_err(e: impl std::fmt::Display) -> FundamentalsError {
    FundamentalsError::unavailable(format!("sqlite: {}", e))
}

impl SqliteFundamentalStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, FundamentalsError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| FundamentalsError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(db_err)?;

        tracing::info!(path = %db_path, pool_size, "opened sqlite fundamental store");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, FundamentalsError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).map_err(db_err)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, FundamentalsError> {
        self.pool.get().map_err(db_err)
    }

    pub fn initialize_schema(&self) -> Result<(), FundamentalsError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS fundamentals (
                    security TEXT NOT NULL,
                    path TEXT NOT NULL,
                    as_of TEXT NOT NULL,
                    value,
                    PRIMARY KEY (security, path, as_of)
                );
                CREATE INDEX IF NOT EXISTS idx_fundamentals_security ON fundamentals(security);",
            )
            .map_err(db_err)
    }

    /// Upsert records in one transaction.
    pub fn insert_records(&self, records: &[FundamentalRecord]) -> Result<usize, FundamentalsError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_err)?;

        for record in records {
            tx.execute(
                "INSERT OR REPLACE INTO fundamentals (security, path, as_of, value)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.security.as_str(),
                    record.path.as_str(),
                    record.as_of.format("%Y-%m-%d").to_string(),
                    record.value.as_ref().map(to_sql_value).unwrap_or(Value::Null),
                ],
            )
            .map_err(db_err)?;
        }

        tx.commit().map_err(db_err)?;
        tracing::debug!(count = records.len(), "inserted fundamental records");
        Ok(records.len())
    }
}

fn to_sql_value(value: &StoredValue) -> Value {
    match value {
        StoredValue::Number(f) => Value::Real(*f),
        StoredValue::Integer(i) => Value::Integer(*i),
        StoredValue::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        StoredValue::Text(t) => Value::Text(t.clone()),
    }
}

fn from_sql_value(value: Value) -> Option<StoredValue> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(StoredValue::Integer(i)),
        Value::Real(f) => Some(StoredValue::Number(f)),
        Value::Text(t) => Some(StoredValue::infer(&t)),
        Value::Blob(b) => Some(StoredValue::Text(String::from_utf8_lossy(&b).into_owned())),
    }
}

impl FundamentalStore for SqliteFundamentalStore {
    fn lookup(
        &self,
        time: PointInTime,
        security: &SecurityIdentifier,
        path: &FieldPath,
    ) -> Result<Option<StoredValue>, FundamentalsError> {
        let conn = self.conn()?;
        let as_of = time.date().format("%Y-%m-%d").to_string();

        let mut stmt = conn
            .prepare(
                "SELECT value FROM fundamentals
                 WHERE security = ?1 AND path = ?2 AND as_of <= ?3
                 ORDER BY as_of DESC
                 LIMIT 1",
            )
            .map_err(db_err)?;

        let mut rows = stmt
            .query(params![security.as_str(), path.as_str(), as_of])
            .map_err(db_err)?;

        match rows.next().map_err(db_err)? {
            Some(row) => {
                let value: Value = row.get(0).map_err(db_err)?;
                Ok(from_sql_value(value))
            }
            None => Ok(None),
        }
    }

    fn list_securities(&self) -> Result<Vec<SecurityIdentifier>, FundamentalsError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT security FROM fundamentals ORDER BY security")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?;

        let mut securities = Vec::new();
        for row in rows {
            securities.push(SecurityIdentifier::new(&row.map_err(db_err)?)?);
        }
        Ok(securities)
    }
}
