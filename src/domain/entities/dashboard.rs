use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::domain::entities::dataset::{HierarchyRow, PivotTable, ProportionRow, RankingRow};
use crate::domain::entities::filter::FilterState;
use crate::domain::entities::query::ViewKind;

pub const LAST_UPDATE_FORMAT: &str = "%d %B %Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewOutcome<T> {
    Ready { data: T },
    /// No matching rows; rendered as a placeholder chart.
    Empty,
    Failed { error: String },
}

impl<T> ViewOutcome<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            ViewOutcome::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ViewOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View<T> {
    pub key: ViewKind,
    pub title: &'static str,
    pub labels: BTreeMap<&'static str, &'static str>,
    #[serde(flatten)]
    pub outcome: ViewOutcome<T>,
}

impl<T> View<T> {
    pub fn new(kind: ViewKind, outcome: ViewOutcome<T>) -> Self {
        Self {
            key: kind,
            title: kind.title(),
            labels: kind.labels().iter().copied().collect(),
            outcome,
        }
    }
}

/// Everything one refresh produces, handed verbatim to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Local>,
    pub last_update: String,
    pub filters: FilterState,
    pub activity_ranking: View<Vec<RankingRow>>,
    pub viewtime_by_gender: View<Vec<ProportionRow>>,
    pub activity_by_gender: View<PivotTable>,
    pub viewtime_by_region: View<Vec<HierarchyRow>>,
}

impl Dashboard {
    pub fn failed_views(&self) -> Vec<ViewKind> {
        let mut failed = Vec::new();
        if self.activity_ranking.outcome.is_failed() {
            failed.push(ViewKind::ActivityRanking);
        }
        if self.viewtime_by_gender.outcome.is_failed() {
            failed.push(ViewKind::ViewtimeByGender);
        }
        if self.activity_by_gender.outcome.is_failed() {
            failed.push(ViewKind::ActivityByGender);
        }
        if self.viewtime_by_region.outcome.is_failed() {
            failed.push(ViewKind::ViewtimeByRegion);
        }
        failed
    }
}

pub fn last_update_label(at: &DateTime<Local>) -> String {
    at.format(LAST_UPDATE_FORMAT).to_string()
}
