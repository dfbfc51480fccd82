use anyhow::Context;
use sqlx::{types::Json, PgPool};
use time::Date;
use uuid::Uuid;

use super::repo_types::{MealPlanChanges, MealPlanRow, NewMealPlan};

const MEAL_PLAN_COLUMNS: &str = "id, user_id, plan_date, meal_type, location_id, location_name, \
     selected_items, created_at, updated_at";

/// True when `err` wraps a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|e| e.code())
        .is_some_and(|code| code == "23505")
}

impl MealPlanRow {
    /// Inserts the plan, or replaces the location and items of the plan the
    /// user already has for that date and meal.
    pub async fn upsert(db: &PgPool, user_id: Uuid, plan: &NewMealPlan) -> anyhow::Result<MealPlanRow> {
        let row = sqlx::query_as::<_, MealPlanRow>(&format!(
            r#"
            INSERT INTO meal_plans (id, user_id, plan_date, meal_type, location_id,
                                    location_name, selected_items)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, plan_date, meal_type) DO UPDATE
               SET location_id    = EXCLUDED.location_id,
                   location_name  = EXCLUDED.location_name,
                   selected_items = EXCLUDED.selected_items,
                   updated_at     = now()
            RETURNING {MEAL_PLAN_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(plan.plan_date)
        .bind(plan.meal_type.as_str())
        .bind(&plan.location_id)
        .bind(&plan.location_name)
        .bind(Json(&plan.selected_items))
        .fetch_one(db)
        .await
        .context("upsert meal plan")?;
        Ok(row)
    }

    /// Plans in `[start, end]` ordered by date, then breakfast, lunch, dinner.
    pub async fn list_range(
        db: &PgPool,
        user_id: Uuid,
        start: Date,
        end: Date,
    ) -> anyhow::Result<Vec<MealPlanRow>> {
        let rows = sqlx::query_as::<_, MealPlanRow>(&format!(
            r#"
            SELECT {MEAL_PLAN_COLUMNS}
            FROM meal_plans
            WHERE user_id = $1 AND plan_date BETWEEN $2 AND $3
            ORDER BY plan_date,
                     CASE meal_type
                         WHEN 'breakfast' THEN 1
                         WHEN 'lunch' THEN 2
                         WHEN 'dinner' THEN 3
                         ELSE 99
                     END
            "#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await
        .context("list meal plans")?;
        Ok(rows)
    }

    /// Looks a plan up regardless of owner so callers can tell "missing"
    /// from "someone else's".
    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<MealPlanRow>> {
        let row = sqlx::query_as::<_, MealPlanRow>(&format!(
            "SELECT {MEAL_PLAN_COLUMNS} FROM meal_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("select meal plan")?;
        Ok(row)
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        changes: &MealPlanChanges,
    ) -> anyhow::Result<Option<MealPlanRow>> {
        let row = sqlx::query_as::<_, MealPlanRow>(&format!(
            r#"
            UPDATE meal_plans
               SET plan_date      = COALESCE($3, plan_date),
                   meal_type      = COALESCE($4, meal_type),
                   location_id    = COALESCE($5, location_id),
                   location_name  = COALESCE($6, location_name),
                   selected_items = COALESCE($7, selected_items),
                   updated_at     = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {MEAL_PLAN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(changes.plan_date)
        .bind(changes.meal_type.map(|t| t.as_str()))
        .bind(&changes.location_id)
        .bind(&changes.location_name)
        .bind(changes.selected_items.as_ref().map(Json))
        .fetch_optional(db)
        .await
        .context("update meal plan")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM meal_plans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete meal plan")?;
        Ok(result.rows_affected() > 0)
    }
}
