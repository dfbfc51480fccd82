use serde_json::Value;
use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::dto::{MealPlan, MealType};

#[derive(Debug, Clone, FromRow)]
pub struct MealPlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_date: Date,
    pub meal_type: String,
    pub location_id: String,
    pub location_name: String,
    pub selected_items: Json<Vec<Value>>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<MealPlanRow> for MealPlan {
    fn from(r: MealPlanRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            date: r.plan_date,
            meal_type: r.meal_type,
            location_id: r.location_id,
            location_name: r.location_name,
            selected_items: r.selected_items.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMealPlan {
    pub plan_date: Date,
    pub meal_type: MealType,
    pub location_id: String,
    pub location_name: String,
    pub selected_items: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct MealPlanChanges {
    pub plan_date: Option<Date>,
    pub meal_type: Option<MealType>,
    pub location_id: Option<String>,
    pub location_name: Option<String>,
    pub selected_items: Option<Vec<Value>>,
}
