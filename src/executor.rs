//! Query Execution
//!
//! Raw-SQL execution capability backing the extraction loop. The generated
//! SELECT projects an unpredictable column set, so rows are returned as
//! ordered string-keyed JSON maps rather than a fixed struct.

use crate::error::{AgentError, Result};
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// One result row with a dynamic field set.
pub type Row = HashMap<String, serde_json::Value>;

/// Largest integer magnitude representable exactly in a JSON float (2^53 - 1).
/// Wider values are serialized as decimal strings so they survive the trip
/// through the analyst context and the UI untouched.
pub const JSON_SAFE_INTEGER_MAX: i64 = 9_007_199_254_740_991;

/// Coerce a 64-bit integer into a JSON-safe value.
pub fn json_safe_integer(value: i64) -> serde_json::Value {
    if value > JSON_SAFE_INTEGER_MAX || value < -JSON_SAFE_INTEGER_MAX {
        serde_json::Value::String(value.to_string())
    } else {
        serde_json::Value::Number(value.into())
    }
}

/// Raw-SQL execution capability supplied by the surrounding data layer.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run an already-validated statement and return its rows.
    async fn execute_raw(&self, sql: &str) -> Result<Vec<Row>>;
}

/// SQLite-backed executor.
///
/// `open` uses a read-only connection: the safety validator is a keyword
/// filter, not a parser, so the store itself is the second line of defense
/// against a mutating statement slipping through.
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    /// Open an existing database file read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| AgentError::Execution(format!("Failed to open database: {}", e)))?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already-open connection. Used by tests and demo seeding.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    async fn execute_raw(&self, sql: &str) -> Result<Vec<Row>> {
        let conn = Arc::clone(&self.conn);
        let sql = sql.to_string();

        // rusqlite is synchronous; run the query off the async worker.
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| AgentError::Execution("Database connection poisoned".to_string()))?;
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| AgentError::Execution(e.to_string()))?;

            let column_names: Vec<String> =
                stmt.column_names().iter().map(|c| c.to_string()).collect();

            let mut rows = stmt
                .query([])
                .map_err(|e| AgentError::Execution(e.to_string()))?;

            let mut result = Vec::new();
            while let Some(row) = rows.next().map_err(|e| AgentError::Execution(e.to_string()))? {
                let mut record = Row::with_capacity(column_names.len());
                for (idx, name) in column_names.iter().enumerate() {
                    let value = match row
                        .get_ref(idx)
                        .map_err(|e| AgentError::Execution(e.to_string()))?
                    {
                        ValueRef::Null => serde_json::Value::Null,
                        ValueRef::Integer(i) => json_safe_integer(i),
                        ValueRef::Real(f) => serde_json::Number::from_f64(f)
                            .map(serde_json::Value::Number)
                            .unwrap_or(serde_json::Value::Null),
                        ValueRef::Text(t) => {
                            serde_json::Value::String(String::from_utf8_lossy(t).into_owned())
                        }
                        ValueRef::Blob(b) => serde_json::Value::String(
                            b.iter().map(|byte| format!("{:02x}", byte)).collect(),
                        ),
                    };
                    record.insert(name.clone(), value);
                }
                result.push(record);
            }
            Ok(result)
        })
        .await
        .map_err(|e| AgentError::Execution(format!("Executor task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_executor() -> SqliteExecutor {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE ER (id INTEGER, subject TEXT, totalCached REAL, externalId INTEGER);
             INSERT INTO ER VALUES (1, 'Dark mode', 4.5, 9223372036854775807);
             INSERT INTO ER VALUES (2, 'SSO support', NULL, 42);",
        )
        .unwrap();
        SqliteExecutor::from_connection(conn)
    }

    #[tokio::test]
    async fn returns_dynamic_projection() {
        let executor = seeded_executor();
        let rows = executor
            .execute_raw("SELECT subject AS \"name\", totalCached FROM ER ORDER BY id")
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], serde_json::json!("Dark mode"));
        assert_eq!(rows[0]["totalCached"], serde_json::json!(4.5));
        assert_eq!(rows[1]["totalCached"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn coerces_wide_integers_to_strings() {
        let executor = seeded_executor();
        let rows = executor
            .execute_raw("SELECT externalId FROM ER ORDER BY id")
            .await
            .unwrap();
        assert_eq!(
            rows[0]["externalId"],
            serde_json::json!("9223372036854775807")
        );
        // Values inside the float-safe range stay numeric.
        assert_eq!(rows[1]["externalId"], serde_json::json!(42));
    }

    #[tokio::test]
    async fn surfaces_sql_errors() {
        let executor = seeded_executor();
        let err = executor
            .execute_raw("SELECT nope FROM missing_table")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Execution(_)));
    }

    #[test]
    fn json_safe_integer_boundaries() {
        assert_eq!(
            json_safe_integer(JSON_SAFE_INTEGER_MAX),
            serde_json::json!(JSON_SAFE_INTEGER_MAX)
        );
        assert_eq!(
            json_safe_integer(JSON_SAFE_INTEGER_MAX + 1),
            serde_json::json!("9007199254740992")
        );
        assert_eq!(
            json_safe_integer(i64::MIN),
            serde_json::json!("-9223372036854775808")
        );
    }
}
