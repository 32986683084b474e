//! Blocking SQLite executor.
//!
//! The engine's [`Query`] trait is synchronous. The executor owns a
//! current-thread tokio runtime and blocks on every `sqlx` call, so it must
//! not be used from inside another async runtime.

use std::str::FromStr;

use dbx_core::{Query, Row, SqlValue};
use sqlx::query::Query as SqlxQuery;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::error::{Result, SqliteError};

/// Runs engine SQL against one SQLite database.
///
/// The pool holds a single connection that never expires, which keeps an
/// in-memory database alive for the executor's lifetime.
pub struct SqliteExecutor {
    runtime: Runtime,
    pool: SqlitePool,
}

impl SqliteExecutor {
    /// Opens the database at `url` (`sqlite:path.db` or `sqlite::memory:`),
    /// creating the file when missing.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::Io`] when the runtime cannot start and
    /// [`SqliteError::Database`] for a bad URL or a failed connection.
    pub fn connect(url: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = runtime.block_on(
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options),
        )?;
        info!(url = %url, "connected to sqlite");
        Ok(Self { runtime, pool })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Same as [`SqliteExecutor::connect`].
    pub fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:")
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the pool, waiting for the connection to shut down.
    pub fn close(self) {
        self.runtime.block_on(self.pool.close());
    }

    fn run_execute(&self, sql: &str, args: &[SqlValue]) -> Result<u64> {
        let query = bind_all(sqlx::query(sql), args);
        let done = self.runtime.block_on(query.execute(&self.pool))?;
        Ok(done.rows_affected())
    }

    fn run_query(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>> {
        let query = bind_all(sqlx::query(sql), args);
        let rows = self.runtime.block_on(query.fetch_all(&self.pool))?;
        rows.iter().map(decode_row).collect()
    }
}

impl Query for SqliteExecutor {
    fn execute(&self, sql: &str, args: &[SqlValue]) -> dbx_core::Result<u64> {
        debug!(sql = %sql, args = args.len(), "execute");
        Ok(self.run_execute(sql, args)?)
    }

    fn query(&self, sql: &str, args: &[SqlValue]) -> dbx_core::Result<Vec<Row>> {
        debug!(sql = %sql, args = args.len(), "query");
        let rows = self.run_query(sql, args)?;
        debug!(rows = rows.len(), "query returned");
        Ok(rows)
    }
}

fn bind_all<'q>(
    mut query: SqlxQuery<'q, Sqlite, SqliteArguments<'q>>,
    args: &'q [SqlValue],
) -> SqlxQuery<'q, Sqlite, SqliteArguments<'q>> {
    for arg in args {
        query = match arg {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(n) => query.bind(*n),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Blob(b) => query.bind(b.as_slice()),
            SqlValue::Time(t) => query.bind(*t),
        };
    }
    query
}

/// Converts a driver row by the storage class of each value.
fn decode_row(row: &SqliteRow) -> Result<Row> {
    let mut columns = Vec::with_capacity(row.len());
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            let type_name = raw.type_info().name().to_ascii_uppercase();
            match type_name.as_str() {
                "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked(index)?),
                "REAL" | "NUMERIC" => SqlValue::Float(row.try_get_unchecked(index)?),
                "TEXT" | "DATE" | "TIME" | "DATETIME" => {
                    SqlValue::Text(row.try_get_unchecked(index)?)
                }
                "BLOB" => SqlValue::Blob(row.try_get_unchecked(index)?),
                _ => {
                    return Err(SqliteError::UnsupportedValue {
                        column: String::from(column.name()),
                        type_name,
                    });
                }
            }
        };
        columns.push((String::from(column.name()), value));
    }
    Ok(Row::new(columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_values() {
        let executor = SqliteExecutor::in_memory().unwrap();
        executor
            .execute("CREATE TABLE t (a integer, b real, c text, d blob, e text)", &[])
            .unwrap();
        let affected = executor
            .execute(
                "INSERT INTO t VALUES (?, ?, ?, ?, ?)",
                &[
                    SqlValue::Int(7),
                    SqlValue::Float(1.5),
                    SqlValue::Text(String::from("x")),
                    SqlValue::Blob(vec![1, 2]),
                    SqlValue::Null,
                ],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let rows = executor.query("SELECT * FROM t", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.get("a"), Some(&SqlValue::Int(7)));
        assert_eq!(row.get("b"), Some(&SqlValue::Float(1.5)));
        assert_eq!(row.get("C"), Some(&SqlValue::Text(String::from("x"))));
        assert_eq!(row.get("d"), Some(&SqlValue::Blob(vec![1, 2])));
        assert_eq!(row.get("e"), Some(&SqlValue::Null));
    }

    #[test]
    fn test_bool_binds_as_integer() {
        let executor = SqliteExecutor::in_memory().unwrap();
        let rows = executor.query("SELECT ? AS flag", &[SqlValue::Bool(true)]).unwrap();
        assert_eq!(rows[0].opt_bool("flag"), Some(true));
    }

    #[test]
    fn test_driver_error_becomes_query_error() {
        let executor = SqliteExecutor::in_memory().unwrap();
        let err = executor.execute("NOT SQL", &[]).unwrap_err();
        assert!(matches!(err, dbx_core::DbxError::Query(_)));
    }
}
