use anyhow::Context;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::repo_types::{PlanInput, PlanRow};

const PLAN_COLUMNS: &str =
    "id, preset, preset_name, metrics, is_active, created_at, updated_at";

/// Metrics go over the wire as text so Postgres keeps their key order; a
/// `jsonb` parameter would be normalized first.
fn metrics_text(plan: &PlanInput) -> anyhow::Result<String> {
    serde_json::to_string(&plan.metrics).context("encode plan metrics")
}

impl PlanRow {
    /// Deactivates the user's current plan and inserts `plan` as the active one.
    ///
    /// The owning `users` row is locked first so concurrent creates from the
    /// same user run one after the other; the partial unique index on active
    /// plans backs this up.
    pub async fn create_active(db: &PgPool, user_id: Uuid, plan: &PlanInput) -> anyhow::Result<PlanRow> {
        let mut tx = db.begin().await.context("begin tx")?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("lock user row")?;

        let deactivated = sqlx::query(
            r#"
            UPDATE nutrition_plans
               SET is_active = FALSE, updated_at = now()
             WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("deactivate plans")?
        .rows_affected();

        let row = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            INSERT INTO nutrition_plans (id, user_id, preset, preset_name, metrics, is_active)
            VALUES ($1, $2, $3, $4, $5::json, TRUE)
            RETURNING {PLAN_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&plan.preset)
        .bind(&plan.preset_name)
        .bind(metrics_text(plan)?)
        .fetch_one(&mut *tx)
        .await
        .context("insert plan")?;

        tx.commit().await.context("commit tx")?;
        debug!(plan_id = %row.id, deactivated, "plan activated");
        Ok(row)
    }

    pub async fn find_active(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<PlanRow>> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM nutrition_plans WHERE user_id = $1 AND is_active LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("select active plan")?;
        Ok(row)
    }

    pub async fn history(db: &PgPool, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<PlanRow>> {
        let rows = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            SELECT {PLAN_COLUMNS}
            FROM nutrition_plans
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("select plan history")?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<PlanRow>> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM nutrition_plans WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("select plan")?;
        Ok(row)
    }

    pub async fn replace(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        plan: &PlanInput,
    ) -> anyhow::Result<Option<PlanRow>> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            UPDATE nutrition_plans
               SET preset = $3, preset_name = $4, metrics = $5::json, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {PLAN_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&plan.preset)
        .bind(&plan.preset_name)
        .bind(metrics_text(plan)?)
        .fetch_optional(db)
        .await
        .context("update plan")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM nutrition_plans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete plan")?;
        Ok(result.rows_affected() > 0)
    }
}
