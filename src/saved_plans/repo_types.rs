use serde_json::Value;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::meal_plans::dto::MealType;
use crate::saved_plans::dto::SavedMealPlan;

#[derive(Debug, Clone, FromRow)]
pub struct SavedPlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub meal_type: String,
    pub location_id: String,
    pub location_name: String,
    pub selected_items: Json<Vec<Value>>,
    pub image: Option<String>,
    pub stars: i32,
    pub usage_count: i64,
    pub logged_meal_count: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<SavedPlanRow> for SavedMealPlan {
    fn from(r: SavedPlanRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            meal_type: r.meal_type,
            location_id: r.location_id,
            location_name: r.location_name,
            selected_items: r.selected_items.0,
            image: r.image,
            stars: r.stars,
            usage_count: r.usage_count,
            logged_meal_count: r.logged_meal_count,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSavedPlan {
    pub title: String,
    pub meal_type: MealType,
    pub location_id: String,
    pub location_name: String,
    pub selected_items: Vec<Value>,
    pub image: Option<String>,
    pub stars: i32,
}

#[derive(Debug, Clone, Default)]
pub struct SavedPlanChanges {
    pub title: Option<String>,
    pub meal_type: Option<MealType>,
    pub location_id: Option<String>,
    pub location_name: Option<String>,
    pub selected_items: Option<Vec<Value>>,
    pub image: Option<String>,
    pub stars: Option<i32>,
}
