use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::totals::{FormattedTotals, LineItem};

/// A logged meal as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub meal_date: Date,
    pub meal_type: String,
    pub meal_name: String,
    pub location_id: String,
    pub location_name: Option<String>,
    pub items: Vec<LineItem>,
    pub totals: FormattedTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_plan_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub eaten_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    #[serde(default)]
    pub meal_date: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub meal_name: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub saved_plan_id: Option<Uuid>,
    #[serde(default, alias = "timestamp", with = "time::serde::rfc3339::option")]
    pub eaten_at: Option<OffsetDateTime>,
}

/// Fields a client may change on an existing meal. Owner, email and
/// creation time are not listed and therefore cannot be changed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealRequest {
    #[serde(default)]
    pub meal_date: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub meal_name: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, alias = "timestamp", with = "time::serde::rfc3339::option")]
    pub eaten_at: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMealsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub meal_type: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MealList {
    pub meals: Vec<MealLog>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MealEnvelope {
    pub message: &'static str,
    pub meal: MealLog,
}

#[derive(Debug, Serialize)]
pub struct DeletedMeal {
    pub message: &'static str,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSummaryEntry {
    pub id: Uuid,
    pub meal_type: String,
    pub location_name: Option<String>,
    pub item_count: usize,
    pub totals: FormattedTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: Date,
    pub meal_count: usize,
    pub meals: Vec<MealSummaryEntry>,
    pub daily_totals: FormattedTotals,
}

#[derive(Debug, Serialize)]
pub struct UploadedPhoto {
    pub key: String,
    pub url: String,
}
