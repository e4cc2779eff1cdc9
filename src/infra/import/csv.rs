use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use rusqlite::params;
use tracing::info;

use crate::domain::entities::dimension::Dimension;
use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::services::query_composer::{quote_identifier, VIEWTIME_COLUMN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportResult {
    pub row_count: i64,
}

const EVENT_COLUMNS: [&str; 4] = [
    Dimension::Gender.column(),
    Dimension::Region.column(),
    Dimension::Activity.column(),
    VIEWTIME_COLUMN,
];

/// Position of each event column in the csv header, matched case-insensitively.
fn header_positions(headers: &StringRecord) -> Result<[usize; 4]> {
    let mut positions = [0_usize; 4];
    for (slot, column) in positions.iter_mut().zip(EVENT_COLUMNS) {
        *slot = headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(column))
            .with_context(|| format!("csv header is missing column {column}"))?;
    }
    Ok(positions)
}

/// Appends the events of a csv file to `table` in one transaction.
pub fn import_events_csv(db_path: &Path, table: &str, csv_path: &Path) -> Result<ImportResult> {
    init_db(db_path, table)?;

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .clone();
    let positions = header_positions(&headers)?;

    let mut conn = open_connection(db_path)?;
    let tx = conn.transaction().context("failed to start transaction")?;

    let mut insert_event = tx
        .prepare(&format!(
            "INSERT INTO {}(GENDER, REGIONID, ACTIVITY, VIEWTIME) VALUES (?1, ?2, ?3, ?4)",
            quote_identifier(table)
        ))
        .context("failed to prepare event insert")?;

    let mut row_count = 0_i64;
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let [gender, region, activity, viewtime] =
            positions.map(|idx| record.get(idx).map(str::trim).unwrap_or(""));
        insert_event
            .execute(params![gender, region, activity, viewtime])
            .context("failed to insert event")?;
        row_count += 1;
    }
    drop(insert_event);

    tx.commit().context("failed to commit import transaction")?;

    info!(row_count, csv = %csv_path.display(), "imported events");
    Ok(ImportResult { row_count })
}
