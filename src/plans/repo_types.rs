use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::targets::MetricTargets;
use crate::plans::dto::NutritionPlan;

#[derive(Debug, Clone, FromRow)]
pub struct PlanRow {
    pub id: Uuid,
    pub preset: Option<String>,
    pub preset_name: Option<String>,
    pub metrics: Json<MetricTargets>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<PlanRow> for NutritionPlan {
    fn from(r: PlanRow) -> Self {
        Self {
            id: r.id,
            preset: r.preset,
            preset_name: r.preset_name,
            metrics: r.metrics.0,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Sanitized plan contents ready to be written.
#[derive(Debug, Clone, Default)]
pub struct PlanInput {
    pub preset: Option<String>,
    pub preset_name: Option<String>,
    pub metrics: MetricTargets,
}
