use anyhow::Context;
use sqlx::{types::Json, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::dto::UserProfile;
use super::repo_types::ProfileRow;

impl ProfileRow {
    pub async fn find(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT data, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("select profile")?;
        Ok(row)
    }

    /// Initial profile written alongside the account.
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        profile: &UserProfile,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, data)
            VALUES ($1, $2)
            "#,
        )
        .bind(user_id)
        .bind(Json(profile))
        .execute(&mut **tx)
        .await
        .context("insert profile")?;
        Ok(())
    }

    /// Shallow-merges `updates` into the stored document, creating the row
    /// when the user has none yet.
    pub async fn merge(
        db: &PgPool,
        user_id: Uuid,
        updates: &UserProfile,
    ) -> anyhow::Result<ProfileRow> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (user_id, data)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
               SET data = profiles.data || EXCLUDED.data,
                   updated_at = now()
            RETURNING data, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(updates))
        .fetch_one(db)
        .await
        .context("merge profile")?;
        Ok(row)
    }
}
