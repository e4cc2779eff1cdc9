use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Gender,
    Region,
    Activity,
}

impl Dimension {
    pub const FILTERABLE: [Dimension; 2] = [Dimension::Gender, Dimension::Region];

    /// Physical column name in the event table.
    pub const fn column(self) -> &'static str {
        match self {
            Dimension::Gender => "GENDER",
            Dimension::Region => "REGIONID",
            Dimension::Activity => "ACTIVITY",
        }
    }

    pub fn is_filterable(self) -> bool {
        Self::FILTERABLE.contains(&self)
    }

    /// Rejects dimensions that have no catalog (activity is group-only).
    pub fn ensure_filterable(self) -> Result<Self, DashboardError> {
        if self.is_filterable() {
            Ok(self)
        } else {
            Err(DashboardError::InvalidDimension(self.to_string()))
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Gender => "gender",
            Dimension::Region => "region",
            Dimension::Activity => "activity",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Dimension {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gender" => Ok(Dimension::Gender),
            "region" | "regionid" => Ok(Dimension::Region),
            "activity" => Ok(Dimension::Activity),
            _ => Err(DashboardError::InvalidDimension(value.to_string())),
        }
    }
}

/// A categorical value as the store reports it. Ordering puts integers
/// before text; it only exists so values can live in ordered sets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Integer(i64),
    Text(String),
}

impl DimensionValue {
    pub fn text(value: impl Into<String>) -> Self {
        DimensionValue::Text(value.into())
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionValue::Integer(value) => write!(f, "{value}"),
            DimensionValue::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for DimensionValue {
    fn from(value: &str) -> Self {
        DimensionValue::Text(value.to_string())
    }
}

impl From<String> for DimensionValue {
    fn from(value: String) -> Self {
        DimensionValue::Text(value)
    }
}

impl From<i64> for DimensionValue {
    fn from(value: i64) -> Self {
        DimensionValue::Integer(value)
    }
}

/// Distinct values a filterable dimension currently holds, in store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub dimension: Dimension,
    pub values: Vec<DimensionValue>,
}

impl Catalog {
    /// The catalog entry a requested value refers to. Text requests also
    /// match numeric entries by their display form, so `"1"` finds `1`.
    pub fn resolve(&self, value: &DimensionValue) -> Option<&DimensionValue> {
        self.values
            .iter()
            .find(|entry| *entry == value)
            .or_else(|| match value {
                DimensionValue::Text(raw) => {
                    let raw = raw.trim();
                    self.values.iter().find(|entry| match entry {
                        DimensionValue::Integer(number) => number.to_string() == raw,
                        DimensionValue::Text(_) => false,
                    })
                }
                DimensionValue::Integer(_) => None,
            })
    }

    pub fn to_set(&self) -> BTreeSet<DimensionValue> {
        self.values.iter().cloned().collect()
    }
}
