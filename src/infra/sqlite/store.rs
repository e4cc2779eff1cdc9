use std::path::PathBuf;
use std::time::{Duration, Instant};

use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, ErrorCode, ToSql};
use tracing::debug;

use crate::domain::entities::dataset::{CellValue, ResultSet};
use crate::domain::entities::dimension::DimensionValue;
use crate::domain::entities::query::SqlStatement;
use crate::infra::sqlite::schema::open_read_only;
use crate::usecase::ports::store::{EventStore, StoreError};

/// VM instructions between deadline checks.
const PROGRESS_OPS: i32 = 1_000;

impl ToSql for DimensionValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            DimensionValue::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            DimensionValue::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
        })
    }
}

/// Event store backed by a SQLite file. Each call opens its own read-only
/// connection and is interrupted once `timeout` elapses.
pub struct SqliteEventStore {
    pub db_path: PathBuf,
    pub timeout: Duration,
}

impl SqliteEventStore {
    pub fn new(db_path: PathBuf, timeout: Duration) -> Self {
        Self { db_path, timeout }
    }
}

impl EventStore for SqliteEventStore {
    fn execute(&self, statement: &SqlStatement) -> Result<ResultSet, StoreError> {
        let conn = open_read_only(&self.db_path, self.timeout).map_err(|err| {
            StoreError::Unavailable(format!(
                "failed to open db {}: {err}",
                self.db_path.display()
            ))
        })?;

        let started = Instant::now();
        let deadline = started + self.timeout;
        conn.progress_handler(PROGRESS_OPS, Some(move || Instant::now() >= deadline));

        let result = run_statement(&conn, statement);
        conn.progress_handler(PROGRESS_OPS, None::<fn() -> bool>);

        let elapsed = started.elapsed();
        debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            ok = result.is_ok(),
            "executed statement"
        );
        result.map_err(|err| classify(err, self.timeout))
    }
}

fn run_statement(conn: &Connection, statement: &SqlStatement) -> rusqlite::Result<ResultSet> {
    let mut stmt = conn.prepare(&statement.sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut rows = stmt.query(params_from_iter(statement.params.iter()))?;
    let mut cells = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(to_cell(row.get_ref(idx)?));
        }
        cells.push(values);
    }

    Ok(ResultSet::new(columns, cells))
}

fn to_cell(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(value) => CellValue::Integer(value),
        ValueRef::Real(value) => CellValue::Real(value),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            CellValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn classify(err: rusqlite::Error, timeout: Duration) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::OperationInterrupted => StoreError::Timeout(timeout),
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::SystemIoFailure
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked => StoreError::Unavailable(err.to_string()),
            _ => StoreError::QueryFailed(err.to_string()),
        },
        _ => StoreError::QueryFailed(err.to_string()),
    }
}
