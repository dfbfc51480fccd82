use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::meals::dto::MealLog;
use crate::nutrition::totals::{FormattedTotals, LineItem};

/// Row of the `meal_logs` table.
#[derive(Debug, Clone, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub meal_date: Date,
    pub meal_type: String,
    pub meal_name: String,
    pub location_id: String,
    pub location_name: Option<String>,
    pub items: Json<Vec<LineItem>>,
    pub totals: Json<FormattedTotals>,
    pub image_url: Option<String>,
    pub saved_plan_id: Option<Uuid>,
    pub eaten_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<MealRow> for MealLog {
    fn from(r: MealRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            user_email: r.user_email,
            meal_date: r.meal_date,
            meal_type: r.meal_type,
            meal_name: r.meal_name,
            location_id: r.location_id,
            location_name: r.location_name,
            items: r.items.0,
            totals: r.totals.0,
            image_url: r.image_url,
            saved_plan_id: r.saved_plan_id,
            eaten_at: r.eaten_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Validated input for a new meal row; totals are already derived.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub user_id: Uuid,
    pub user_email: String,
    pub meal_date: Date,
    pub meal_type: String,
    pub meal_name: String,
    pub location_id: String,
    pub location_name: Option<String>,
    pub items: Vec<LineItem>,
    pub totals: FormattedTotals,
    pub image_url: Option<String>,
    pub saved_plan_id: Option<Uuid>,
    pub eaten_at: Option<OffsetDateTime>,
}

/// Partial update; `None` keeps the stored value. `totals` is set whenever
/// `items` is.
#[derive(Debug, Clone, Default)]
pub struct MealChanges {
    pub meal_date: Option<Date>,
    pub meal_type: Option<String>,
    pub meal_name: Option<String>,
    pub location_id: Option<String>,
    pub location_name: Option<String>,
    pub items: Option<Vec<LineItem>>,
    pub totals: Option<FormattedTotals>,
    pub image_url: Option<String>,
    pub eaten_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct MealFilter {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub meal_type: Option<String>,
    pub limit: i64,
}
