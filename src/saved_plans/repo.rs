use anyhow::Context;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::{NewSavedPlan, SavedPlanChanges, SavedPlanRow};

/// Columns of `saved_meal_plans` plus the number of meal logs created from
/// each template. Usable after `SELECT` and `RETURNING`.
const SAVED_PLAN_COLUMNS: &str = "id, user_id, title, meal_type, location_id, location_name, \
     selected_items, image, stars, usage_count, \
     (SELECT COUNT(*) FROM meal_logs m WHERE m.saved_plan_id = saved_meal_plans.id) AS logged_meal_count, \
     created_at, updated_at";

impl SavedPlanRow {
    pub async fn insert(db: &PgPool, user_id: Uuid, plan: &NewSavedPlan) -> anyhow::Result<SavedPlanRow> {
        let row = sqlx::query_as::<_, SavedPlanRow>(&format!(
            r#"
            INSERT INTO saved_meal_plans (id, user_id, title, meal_type, location_id,
                                          location_name, selected_items, image, stars)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SAVED_PLAN_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&plan.title)
        .bind(plan.meal_type.as_str())
        .bind(&plan.location_id)
        .bind(&plan.location_name)
        .bind(Json(&plan.selected_items))
        .bind(&plan.image)
        .bind(plan.stars)
        .fetch_one(db)
        .await
        .context("insert saved meal plan")?;
        Ok(row)
    }

    pub async fn list(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<SavedPlanRow>> {
        let rows = sqlx::query_as::<_, SavedPlanRow>(&format!(
            r#"
            SELECT {SAVED_PLAN_COLUMNS}
            FROM saved_meal_plans
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list saved meal plans")?;
        Ok(rows)
    }

    /// Looks a template up regardless of owner.
    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<SavedPlanRow>> {
        let row = sqlx::query_as::<_, SavedPlanRow>(&format!(
            "SELECT {SAVED_PLAN_COLUMNS} FROM saved_meal_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("select saved meal plan")?;
        Ok(row)
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        changes: &SavedPlanChanges,
    ) -> anyhow::Result<Option<SavedPlanRow>> {
        let row = sqlx::query_as::<_, SavedPlanRow>(&format!(
            r#"
            UPDATE saved_meal_plans
               SET title          = COALESCE($3, title),
                   meal_type      = COALESCE($4, meal_type),
                   location_id    = COALESCE($5, location_id),
                   location_name  = COALESCE($6, location_name),
                   selected_items = COALESCE($7, selected_items),
                   image          = COALESCE($8, image),
                   stars          = COALESCE($9, stars),
                   updated_at     = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {SAVED_PLAN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&changes.title)
        .bind(changes.meal_type.map(|t| t.as_str()))
        .bind(&changes.location_id)
        .bind(&changes.location_name)
        .bind(changes.selected_items.as_ref().map(Json))
        .bind(&changes.image)
        .bind(changes.stars)
        .fetch_optional(db)
        .await
        .context("update saved meal plan")?;
        Ok(row)
    }

    /// Atomically bumps the usage counter.
    pub async fn record_use(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<SavedPlanRow>> {
        let row = sqlx::query_as::<_, SavedPlanRow>(&format!(
            r#"
            UPDATE saved_meal_plans
               SET usage_count = usage_count + 1, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {SAVED_PLAN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("increment saved meal plan usage")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM saved_meal_plans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete saved meal plan")?;
        Ok(result.rows_affected() > 0)
    }
}
