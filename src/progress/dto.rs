use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::meals::dto::MealLog;
use crate::nutrition::{
    progress::{CallToAction, ProgressMap},
    totals::FormattedTotals,
    trend::Trend,
};

/// Either the caller has no active plan, or the report against it.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlanProgress<T> {
    Inactive(NoActivePlan),
    Active(T),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoActivePlan {
    pub has_active_plan: bool,
    pub message: &'static str,
}

impl Default for NoActivePlan {
    fn default() -> Self {
        Self {
            has_active_plan: false,
            message: "No active nutrition plan found",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayProgress {
    pub has_active_plan: bool,
    pub plan_name: String,
    pub date: Date,
    pub meal_count: usize,
    pub progress: ProgressMap,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProgress {
    pub date: Date,
    pub meal_count: u32,
    pub totals_formatted: FormattedTotals,
    pub totals_numeric: BTreeMap<String, f64>,
    pub progress: ProgressMap,
    pub call_to_action: Option<CallToAction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeProgress {
    pub has_active_plan: bool,
    pub plan_name: String,
    pub plan_id: Uuid,
    pub range: DateRange,
    pub days: Vec<DayProgress>,
    pub meals: Vec<MealLog>,
    pub trend: Trend,
    pub streak: u32,
}
