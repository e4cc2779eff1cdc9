use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::entities::dimension::DimensionValue;
use crate::domain::entities::magnitude::MagnitudeLabel;
use crate::domain::error::TransformError;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    pub fn to_dimension_value(&self) -> Option<DimensionValue> {
        match self {
            CellValue::Null => None,
            CellValue::Integer(value) => Some(DimensionValue::Integer(*value)),
            CellValue::Real(value) if value.fract() == 0.0 && in_i64_range(*value) => {
                Some(DimensionValue::Integer(*value as i64))
            }
            CellValue::Real(value) => Some(DimensionValue::Text(value.to_string())),
            CellValue::Text(value) => Some(DimensionValue::Text(value.clone())),
        }
    }

    /// Reads an aggregate. Reals truncate toward zero like an integer cast;
    /// text is accepted when it parses as a number.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            CellValue::Null => None,
            CellValue::Integer(value) => Some(*value),
            CellValue::Real(value) if value.is_finite() => Some(value.trunc() as i64),
            CellValue::Real(_) => None,
            CellValue::Text(raw) => {
                let raw = raw.trim();
                raw.parse::<i64>().ok().or_else(|| {
                    raw.parse::<f64>()
                        .ok()
                        .filter(|value| value.is_finite())
                        .map(|value| value.trunc() as i64)
                })
            }
        }
    }

    pub fn raw(&self) -> String {
        match self {
            CellValue::Null => "NULL".to_string(),
            CellValue::Integer(value) => value.to_string(),
            CellValue::Real(value) => value.to_string(),
            CellValue::Text(value) => value.clone(),
        }
    }
}

/// Finite and exactly representable as an i64 once integral.
fn in_i64_range(value: f64) -> bool {
    value >= i64::MIN as f64 && value < -(i64::MIN as f64)
}

/// Rows as the store returned them, with named columns in store order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TransformError> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
            .ok_or_else(|| TransformError::MissingColumn(name.to_string()))
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&CellValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingRow {
    pub activity: DimensionValue,
    pub count: i64,
}

/// One slice of the gender share chart. Genders without matching events
/// are absent rather than zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProportionRow {
    pub gender: DimensionValue,
    pub total_viewtime: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<RowIssue>,
}

/// Wide gender x activity table; cells missing from the source are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "PivotDataset")]
pub struct PivotTable {
    pub row_keys: Vec<DimensionValue>,
    pub column_keys: Vec<DimensionValue>,
    pub cells: Vec<Vec<i64>>,
}

impl PivotTable {
    pub fn get(&self, row: &DimensionValue, column: &DimensionValue) -> Option<i64> {
        let row_idx = self.row_keys.iter().position(|key| key == row)?;
        let col_idx = self.column_keys.iter().position(|key| key == column)?;
        self.cells
            .get(row_idx)
            .and_then(|cells| cells.get(col_idx))
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty()
    }

    /// Row-per-gender view keyed by activity name.
    pub fn rows(&self) -> Vec<PivotRow> {
        self.row_keys
            .iter()
            .zip(&self.cells)
            .map(|(gender, cells)| PivotRow {
                gender: gender.clone(),
                counts: self
                    .column_keys
                    .iter()
                    .map(ToString::to_string)
                    .zip(cells.iter().copied())
                    .collect(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotRow {
    pub gender: DimensionValue,
    pub counts: BTreeMap<String, i64>,
}

/// Serialized form of a pivot: the stack order plus one row per gender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotDataset {
    pub columns: Vec<DimensionValue>,
    pub rows: Vec<PivotRow>,
}

impl From<PivotTable> for PivotDataset {
    fn from(table: PivotTable) -> Self {
        PivotDataset {
            rows: table.rows(),
            columns: table.column_keys,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowIssue {
    Negative { raw: i64 },
    NonNumeric { raw: String },
}

/// A treemap tile. `total_viewtime` sizes the tile; `label` is display only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyRow {
    pub region: DimensionValue,
    pub total_viewtime: i64,
    pub label: MagnitudeLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<RowIssue>,
}
