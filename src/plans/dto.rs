use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{planner::Recommendation, targets::MetricTargets};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionPlan {
    pub id: Uuid,
    pub preset: Option<String>,
    pub preset_name: Option<String>,
    pub metrics: MetricTargets,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl NutritionPlan {
    pub fn display_name(&self) -> &str {
        self.preset_name.as_deref().unwrap_or("Custom Plan")
    }
}

/// Body of plan create and update. Update replaces all three fields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub preset_name: Option<String>,
    #[serde(default)]
    pub metrics: Option<MetricTargets>,
}

impl PlanRequest {
    pub fn is_empty(&self) -> bool {
        self.preset.is_none() && self.preset_name.is_none() && self.metrics.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PlanEnvelope {
    pub message: &'static str,
    pub plan: NutritionPlan,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: Option<NutritionPlan>,
}

#[derive(Debug, Serialize)]
pub struct PlanHistory {
    pub plans: Vec<NutritionPlan>,
}

#[derive(Debug, Serialize)]
pub struct DeletedPlan {
    pub message: &'static str,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PersonalizedResponse {
    pub recommendation: Recommendation,
}
