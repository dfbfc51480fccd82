use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// Reusable meal template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub meal_type: String,
    pub location_id: String,
    pub location_name: String,
    pub selected_items: Vec<Value>,
    pub image: Option<String>,
    pub stars: i32,
    pub usage_count: i64,
    /// Meal logs created from this template.
    pub logged_meal_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSavedPlanRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub selected_items: Option<Vec<Value>>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stars: Option<i32>,
}

/// Only these fields can change; owner, usage count and timestamps cannot.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSavedPlanRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub selected_items: Option<Vec<Value>>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stars: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlanEnvelope {
    pub message: &'static str,
    pub saved_plan: SavedMealPlan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlanList {
    pub saved_plans: Vec<SavedMealPlan>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeletedSavedPlan {
    pub message: &'static str,
    pub id: Uuid,
}
