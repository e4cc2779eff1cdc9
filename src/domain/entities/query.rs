use std::fmt;

use serde::Serialize;

use crate::domain::entities::dimension::{Dimension, DimensionValue};

/// The four views of the dashboard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    ActivityRanking,
    ViewtimeByGender,
    ActivityByGender,
    ViewtimeByRegion,
}

impl ViewKind {
    pub fn key(self) -> &'static str {
        match self {
            ViewKind::ActivityRanking => "activity_ranking",
            ViewKind::ViewtimeByGender => "viewtime_by_gender",
            ViewKind::ActivityByGender => "activity_by_gender",
            ViewKind::ViewtimeByRegion => "viewtime_by_region",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::ActivityRanking => "1. Distribution of Activities",
            ViewKind::ViewtimeByGender => "2. Total View Time by Gender",
            ViewKind::ActivityByGender => "3. Activity Distribution by Gender",
            ViewKind::ViewtimeByRegion => "4. Total Viewtime by Region",
        }
    }

    /// Axis/legend labels the renderer shows for the view's fields.
    pub fn labels(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ViewKind::ActivityRanking => &[("activity", "Activity Type"), ("count", "Count")],
            ViewKind::ViewtimeByGender => {
                &[("gender", "Gender"), ("total_viewtime", "Total View Time")]
            }
            ViewKind::ActivityByGender => &[("gender", "Gender"), ("value", "Count")],
            ViewKind::ViewtimeByRegion => &[
                ("region", "Region ID"),
                ("total_viewtime", "Total View Time"),
            ],
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Count,
    /// SUM over an integer cast of the named column.
    SumAsInteger(&'static str),
}

impl Aggregation {
    /// Output column name of the aggregate.
    pub const fn alias(self) -> &'static str {
        match self {
            Aggregation::Count => "Count",
            Aggregation::SumAsInteger(_) => "TotalViewTime",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Dimension(Dimension),
    Aggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// `dimension IN values`; an empty value list matches no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub dimension: Dimension,
    pub values: Vec<DimensionValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub view: ViewKind,
    pub table: String,
    pub group_by: Vec<Dimension>,
    pub aggregation: Aggregation,
    pub predicates: Vec<Predicate>,
    pub order_by: Vec<SortSpec>,
}

/// Query text plus the values bound to its `?N` placeholders, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<DimensionValue>,
}
