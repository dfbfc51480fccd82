use anyhow::Context;
use sqlx::{types::Json, PgPool};
use time::Date;
use uuid::Uuid;

use super::repo_types::{MealChanges, MealFilter, MealRow, NewMeal};

const MEAL_COLUMNS: &str = "id, user_id, user_email, meal_date, meal_type, meal_name, \
     location_id, location_name, items, totals, image_url, saved_plan_id, \
     eaten_at, created_at, updated_at";

impl MealRow {
    pub async fn insert(db: &PgPool, meal: &NewMeal) -> anyhow::Result<MealRow> {
        let row = sqlx::query_as::<_, MealRow>(&format!(
            r#"
            INSERT INTO meal_logs (id, user_id, user_email, meal_date, meal_type, meal_name,
                                   location_id, location_name, items, totals, image_url,
                                   saved_plan_id, eaten_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, COALESCE($13, now()))
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(meal.user_id)
        .bind(&meal.user_email)
        .bind(meal.meal_date)
        .bind(&meal.meal_type)
        .bind(&meal.meal_name)
        .bind(&meal.location_id)
        .bind(&meal.location_name)
        .bind(Json(&meal.items))
        .bind(Json(&meal.totals))
        .bind(&meal.image_url)
        .bind(meal.saved_plan_id)
        .bind(meal.eaten_at)
        .fetch_one(db)
        .await
        .context("insert meal log")?;
        Ok(row)
    }

    pub async fn list(db: &PgPool, user_id: Uuid, filter: &MealFilter) -> anyhow::Result<Vec<MealRow>> {
        let rows = sqlx::query_as::<_, MealRow>(&format!(
            r#"
            SELECT {MEAL_COLUMNS}
            FROM meal_logs
            WHERE user_id = $1
              AND ($2::date IS NULL OR meal_date >= $2)
              AND ($3::date IS NULL OR meal_date <= $3)
              AND ($4::text IS NULL OR meal_type = $4)
            ORDER BY eaten_at DESC
            LIMIT $5
            "#
        ))
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(&filter.meal_type)
        .bind(filter.limit)
        .fetch_all(db)
        .await
        .context("list meal logs")?;
        Ok(rows)
    }

    /// Meals in `[start, end]`, oldest first.
    pub async fn in_range(
        db: &PgPool,
        user_id: Uuid,
        start: Date,
        end: Date,
    ) -> anyhow::Result<Vec<MealRow>> {
        let rows = sqlx::query_as::<_, MealRow>(&format!(
            r#"
            SELECT {MEAL_COLUMNS}
            FROM meal_logs
            WHERE user_id = $1 AND meal_date BETWEEN $2 AND $3
            ORDER BY meal_date, eaten_at
            "#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await
        .context("select meal logs in range")?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealRow>> {
        let row = sqlx::query_as::<_, MealRow>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meal_logs WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("select meal log")?;
        Ok(row)
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        changes: &MealChanges,
    ) -> anyhow::Result<Option<MealRow>> {
        let row = sqlx::query_as::<_, MealRow>(&format!(
            r#"
            UPDATE meal_logs
               SET meal_date     = COALESCE($3, meal_date),
                   meal_type     = COALESCE($4, meal_type),
                   meal_name     = COALESCE($5, meal_name),
                   location_id   = COALESCE($6, location_id),
                   location_name = COALESCE($7, location_name),
                   items         = COALESCE($8, items),
                   totals        = COALESCE($9, totals),
                   image_url     = COALESCE($10, image_url),
                   eaten_at      = COALESCE($11, eaten_at),
                   updated_at    = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(changes.meal_date)
        .bind(&changes.meal_type)
        .bind(&changes.meal_name)
        .bind(&changes.location_id)
        .bind(&changes.location_name)
        .bind(changes.items.as_ref().map(Json))
        .bind(changes.totals.as_ref().map(Json))
        .bind(&changes.image_url)
        .bind(changes.eaten_at)
        .fetch_optional(db)
        .await
        .context("update meal log")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM meal_logs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete meal log")?;
        Ok(result.rows_affected() > 0)
    }
}
