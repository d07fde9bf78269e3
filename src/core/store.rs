//! Purpose: Store boundary traits plus the shipped SQLite implementation.
//! Exports: `ConnectionProvider`, `StoreConnection`, `SqliteProvider`, `SqliteConnection`.
//! Role: Canonical seam between the core and the embedded store.
//! Invariants: All rusqlite interaction is confined to this module.
//! Invariants: Open/close failures surface as `ErrorKind::Acquisition`.
use std::path::Path;

use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;

use crate::core::error::{Error, ErrorKind};
use crate::core::statement::{ResultSet, Row, Value};

/// A live handle to the store. Never shared across tasks; each connection is
/// owned by exactly one scope for its entire lifetime.
pub trait StoreConnection: Send {
    /// Number of positional parameters the statement expects, determined by
    /// preparing it without executing.
    fn parameter_count(&mut self, sql: &str) -> Result<usize, Error>;

    /// Execute a statement with positional parameters, materializing all rows.
    /// Write statements yield an empty result set.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, Error>;

    fn begin(&mut self) -> Result<(), Error>;

    fn commit(&mut self) -> Result<(), Error>;

    fn rollback(&mut self) -> Result<(), Error>;
}

/// Opens and closes connections to a store located by path.
pub trait ConnectionProvider {
    type Conn: StoreConnection;

    fn open(&self, location: &Path) -> Result<Self::Conn, Error>;

    fn close(&self, conn: Self::Conn) -> Result<(), Error>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SqliteProvider;

impl SqliteProvider {
    pub fn new() -> Self {
        Self
    }
}

pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl ConnectionProvider for SqliteProvider {
    type Conn = SqliteConnection;

    fn open(&self, location: &Path) -> Result<Self::Conn, Error> {
        let conn = rusqlite::Connection::open(location).map_err(|err| {
            Error::new(ErrorKind::Acquisition)
                .with_message("failed to open store")
                .with_path(location)
                .with_source(err)
        })?;
        Ok(SqliteConnection { conn })
    }

    fn close(&self, conn: Self::Conn) -> Result<(), Error> {
        conn.conn.close().map_err(|(_, err)| {
            Error::new(ErrorKind::Acquisition)
                .with_message("failed to close store")
                .with_source(err)
        })
    }
}

impl StoreConnection for SqliteConnection {
    fn parameter_count(&mut self, sql: &str) -> Result<usize, Error> {
        let stmt = self
            .conn
            .prepare(sql)
            .map_err(|err| execution_error(sql, err))?;
        Ok(stmt.parameter_count())
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, Error> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|err| execution_error(sql, err))?;
        let column_count = stmt.column_count();

        let bound = params.iter().map(to_sql_value);
        let mut rows = stmt
            .query(params_from_iter(bound))
            .map_err(|err| execution_error(sql, err))?;

        let mut out: Vec<Row> = Vec::new();
        while let Some(row) = rows.next().map_err(|err| execution_error(sql, err))? {
            let mut fields = Vec::with_capacity(column_count);
            for index in 0..column_count {
                let value: SqlValue = row
                    .get(index)
                    .map_err(|err| execution_error(sql, err))?;
                fields.push(from_sql_value(value));
            }
            out.push(fields);
        }
        Ok(ResultSet::new(out))
    }

    fn begin(&mut self) -> Result<(), Error> {
        self.conn
            .execute_batch("BEGIN DEFERRED")
            .map_err(|err| execution_error("BEGIN DEFERRED", err))
    }

    fn commit(&mut self) -> Result<(), Error> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|err| execution_error("COMMIT", err))
    }

    fn rollback(&mut self) -> Result<(), Error> {
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|err| execution_error("ROLLBACK", err))
    }
}

fn execution_error(sql: &str, err: rusqlite::Error) -> Error {
    Error::new(ErrorKind::Execution)
        .with_message("store rejected statement")
        .with_statement(sql)
        .with_source(err)
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(value) => SqlValue::Integer(*value),
        Value::Real(value) => SqlValue::Real(*value),
        Value::Text(value) => SqlValue::Text(value.clone()),
        Value::Blob(bytes) => SqlValue::Blob(bytes.clone()),
    }
}

fn from_sql_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(value) => Value::Integer(value),
        SqlValue::Real(value) => Value::Real(value),
        SqlValue::Text(value) => Value::Text(value),
        SqlValue::Blob(bytes) => Value::Blob(bytes),
    }
}
