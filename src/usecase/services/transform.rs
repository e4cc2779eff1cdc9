//! Shapes raw result sets into the datasets each chart consumes.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::warn;

use crate::domain::entities::dataset::{
    HierarchyRow, PivotTable, ProportionRow, RankingRow, ResultSet, RowIssue,
};
use crate::domain::entities::dimension::{Dimension, DimensionValue};
use crate::domain::entities::magnitude::MagnitudeLabel;
use crate::domain::entities::query::Aggregation;
use crate::domain::error::TransformError;
use crate::usecase::services::query_composer::VIEWTIME_COLUMN;

const COUNT: &str = Aggregation::Count.alias();
const TOTAL_VIEWTIME: &str = Aggregation::SumAsInteger(VIEWTIME_COLUMN).alias();

/// Activity counts, already ordered by the store.
pub fn ranking(result: &ResultSet) -> Result<Vec<RankingRow>, TransformError> {
    let activity_idx = result.column_index(Dimension::Activity.column())?;
    let count_idx = result.column_index(COUNT)?;

    let mut rows = Vec::with_capacity(result.rows.len());
    for row in 0..result.rows.len() {
        let Some(activity) = key_at(result, row, activity_idx) else {
            continue;
        };
        rows.push(RankingRow {
            activity,
            count: count_at(result, row, count_idx)?,
        });
    }
    Ok(rows)
}

/// Viewtime per gender, one row per selected gender that had events.
pub fn proportion(
    result: &ResultSet,
    selected: &BTreeSet<DimensionValue>,
) -> Result<Vec<ProportionRow>, TransformError> {
    let gender_idx = result.column_index(Dimension::Gender.column())?;
    let total_idx = result.column_index(TOTAL_VIEWTIME)?;

    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(result.rows.len());
    for row in 0..result.rows.len() {
        let Some(gender) = key_at(result, row, gender_idx) else {
            continue;
        };
        if !selected.contains(&gender) {
            warn!(%gender, "dropping unselected gender from proportion view");
            continue;
        }
        if !seen.insert(gender.clone()) {
            return Err(TransformError::DuplicateEntry(format!("gender={gender}")));
        }
        let (total_viewtime, issue) = viewtime_at(result, row, total_idx, &gender);
        rows.push(ProportionRow {
            gender,
            total_viewtime,
            issue,
        });
    }
    Ok(rows)
}

/// Gender x activity counts in wide form. Keys are the values observed in
/// the result, ascending; missing combinations are zero.
pub fn pivot(result: &ResultSet) -> Result<PivotTable, TransformError> {
    let gender_idx = result.column_index(Dimension::Gender.column())?;
    let activity_idx = result.column_index(Dimension::Activity.column())?;
    let count_idx = result.column_index(COUNT)?;

    let mut entries = BTreeMap::new();
    let mut activities = BTreeSet::new();
    for row in 0..result.rows.len() {
        let (Some(gender), Some(activity)) = (
            key_at(result, row, gender_idx),
            key_at(result, row, activity_idx),
        ) else {
            continue;
        };
        let count = count_at(result, row, count_idx)?;
        activities.insert(activity.clone());
        if entries.insert((gender.clone(), activity.clone()), count).is_some() {
            return Err(TransformError::DuplicateEntry(format!(
                "gender={gender}, activity={activity}"
            )));
        }
    }

    let row_keys: Vec<DimensionValue> = entries
        .keys()
        .map(|(gender, _)| gender.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let column_keys: Vec<DimensionValue> = activities.into_iter().collect();
    let cells = row_keys
        .iter()
        .map(|gender| {
            column_keys
                .iter()
                .map(|activity| {
                    entries
                        .get(&(gender.clone(), activity.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    Ok(PivotTable {
        row_keys,
        column_keys,
        cells,
    })
}

/// Treemap tiles for the selected regions, smallest first, each with a
/// magnitude label. Rows with bad totals are clamped to zero and flagged.
pub fn hierarchy(
    result: &ResultSet,
    selected: &BTreeSet<DimensionValue>,
) -> Result<Vec<HierarchyRow>, TransformError> {
    let region_idx = result.column_index(Dimension::Region.column())?;
    let total_idx = result.column_index(TOTAL_VIEWTIME)?;

    let mut rows = Vec::with_capacity(result.rows.len());
    for row in 0..result.rows.len() {
        let Some(region) = key_at(result, row, region_idx) else {
            continue;
        };
        if !selected.contains(&region) {
            continue;
        }
        let (total_viewtime, issue) = viewtime_at(result, row, total_idx, &region);
        rows.push(HierarchyRow {
            region,
            total_viewtime,
            label: MagnitudeLabel::from(total_viewtime),
            issue,
        });
    }

    rows.sort_by_key(|row| row.total_viewtime);
    Ok(rows)
}

fn key_at(result: &ResultSet, row: usize, column: usize) -> Option<DimensionValue> {
    let value = result.cell(row, column).to_dimension_value();
    if value.is_none() {
        warn!(row, column = %result.columns[column], "skipping row with null key");
    }
    value
}

fn count_at(result: &ResultSet, row: usize, column: usize) -> Result<i64, TransformError> {
    let cell = result.cell(row, column);
    cell.to_integer()
        .ok_or_else(|| TransformError::NonNumeric {
            row,
            column: COUNT.to_string(),
            raw: cell.raw(),
        })
}

fn viewtime_at(
    result: &ResultSet,
    row: usize,
    column: usize,
    key: &DimensionValue,
) -> (i64, Option<RowIssue>) {
    let cell = result.cell(row, column);
    match cell.to_integer() {
        Some(value) if value < 0 => {
            warn!(%key, value, "clamping negative viewtime total to zero");
            (0, Some(RowIssue::Negative { raw: value }))
        }
        Some(value) => (value, None),
        None => {
            let raw = cell.raw();
            warn!(%key, %raw, "treating non-numeric viewtime total as zero");
            (0, Some(RowIssue::NonNumeric { raw }))
        }
    }
}
