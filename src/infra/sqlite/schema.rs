use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};

use crate::usecase::services::query_composer::quote_identifier;

pub const DEFAULT_TABLE: &str = "PageviewActivity_REALTIME";

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.busy_timeout(Duration::from_secs(5))
        .context("failed to set busy timeout")?;
    Ok(conn)
}

/// Opens an existing database for reads only; a missing file is an error
/// instead of a fresh empty database.
pub fn open_read_only(db_path: &Path, busy_timeout: Duration) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(busy_timeout)?;
    Ok(conn)
}

pub fn init_db(db_path: &Path, table: &str) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;
    let table_ident = quote_identifier(table);
    let index_ident = quote_identifier(&format!("idx_{table}_gender_region"));

    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {table_ident} (
            GENDER      TEXT,
            REGIONID    TEXT,
            ACTIVITY    TEXT,
            VIEWTIME    TEXT,
            imported_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS {index_ident}
            ON {table_ident}(GENDER, REGIONID);
        ",
    ))
    .context("failed to initialize schema")?;

    Ok(())
}
