use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::dto::RequestDirection;
use super::repo_types::{FriendPair, FriendRequestRow, FriendRow, UserCardRow};

const REQUEST_SELECT: &str = r#"
    SELECT r.id, r.status, r.created_at, r.updated_at,
           r.from_user_id,
           fu.email               AS from_email,
           fp.data->>'firstName'  AS from_first_name,
           fp.data->>'lastName'   AS from_last_name,
           r.to_user_id,
           tu.email               AS to_email,
           tp.data->>'firstName'  AS to_first_name,
           tp.data->>'lastName'   AS to_last_name
    FROM friend_requests r
    JOIN users fu ON fu.id = r.from_user_id
    LEFT JOIN profiles fp ON fp.user_id = r.from_user_id
    JOIN users tu ON tu.id = r.to_user_id
    LEFT JOIN profiles tp ON tp.user_id = r.to_user_id
"#;

impl FriendRequestRow {
    /// Opens a pending request; `None` when one is already open in that
    /// direction.
    pub async fn insert(db: &PgPool, from: Uuid, to: Uuid) -> anyhow::Result<Option<FriendRequestRow>> {
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO friend_requests (id, from_user_id, to_user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (from_user_id, to_user_id) WHERE status = 'pending' DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(from)
        .bind(to)
        .fetch_optional(db)
        .await
        .context("insert friend request")?;

        match id {
            Some(id) => Self::find(db, id).await,
            None => Ok(None),
        }
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<FriendRequestRow>> {
        let row = sqlx::query_as::<_, FriendRequestRow>(&format!("{REQUEST_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("select friend request")?;
        Ok(row)
    }

    /// The open request between two users, in either direction.
    pub async fn pending_between(db: &PgPool, a: Uuid, b: Uuid) -> anyhow::Result<Option<FriendRequestRow>> {
        let row = sqlx::query_as::<_, FriendRequestRow>(&format!(
            r#"
            {REQUEST_SELECT}
            WHERE r.status = 'pending'
              AND ((r.from_user_id = $1 AND r.to_user_id = $2)
                OR (r.from_user_id = $2 AND r.to_user_id = $1))
            ORDER BY r.created_at
            LIMIT 1
            "#
        ))
        .bind(a)
        .bind(b)
        .fetch_optional(db)
        .await
        .context("select pending friend request")?;
        Ok(row)
    }

    /// Pending requests the user sent and/or received, newest first.
    pub async fn pending_for(
        db: &PgPool,
        user_id: Uuid,
        direction: RequestDirection,
    ) -> anyhow::Result<Vec<FriendRequestRow>> {
        let rows = sqlx::query_as::<_, FriendRequestRow>(&format!(
            r#"
            {REQUEST_SELECT}
            WHERE r.status = 'pending'
              AND (($2 AND r.from_user_id = $1) OR ($3 AND r.to_user_id = $1))
            ORDER BY r.created_at DESC
            "#
        ))
        .bind(user_id)
        .bind(direction.includes_sent())
        .bind(direction.includes_received())
        .fetch_all(db)
        .await
        .context("list friend requests")?;
        Ok(rows)
    }

    /// Closes a pending request addressed to `to_user_id`. Accepting records
    /// the friendship in the same transaction. `None` when the request is no
    /// longer pending.
    pub async fn resolve(
        db: &PgPool,
        id: Uuid,
        to_user_id: Uuid,
        accept: bool,
    ) -> anyhow::Result<Option<FriendRequestRow>> {
        let mut tx = db.begin().await.context("begin friend request tx")?;

        let from: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE friend_requests
               SET status = $3, updated_at = now()
             WHERE id = $1 AND to_user_id = $2 AND status = 'pending'
            RETURNING from_user_id
            "#,
        )
        .bind(id)
        .bind(to_user_id)
        .bind(if accept { "accepted" } else { "rejected" })
        .fetch_optional(&mut *tx)
        .await
        .context("close friend request")?;

        let Some(from) = from else {
            return Ok(None);
        };

        if accept {
            let pair = FriendPair::of(from, to_user_id);
            sqlx::query(
                r#"
                INSERT INTO friendships (user_low, user_high)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(pair.low)
            .bind(pair.high)
            .execute(&mut *tx)
            .await
            .context("insert friendship")?;
        }

        tx.commit().await.context("commit friend request tx")?;
        Self::find(db, id).await
    }
}

impl FriendPair {
    pub async fn exists(&self, db: &PgPool) -> anyhow::Result<bool> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM friendships WHERE user_low = $1 AND user_high = $2)",
        )
        .bind(self.low)
        .bind(self.high)
        .fetch_one(db)
        .await
        .context("check friendship")?;
        Ok(found)
    }

    pub async fn delete(&self, db: &PgPool) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM friendships WHERE user_low = $1 AND user_high = $2")
            .bind(self.low)
            .bind(self.high)
            .execute(db)
            .await
            .context("delete friendship")?;
        Ok(result.rows_affected() > 0)
    }
}

impl FriendRow {
    pub async fn list(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FriendRow>> {
        let rows = sqlx::query_as::<_, FriendRow>(
            r#"
            SELECT u.id, u.email,
                   p.data->>'firstName' AS first_name,
                   p.data->>'lastName'  AS last_name,
                   p.data->>'residence' AS residence,
                   f.created_at
            FROM friendships f
            JOIN users u
              ON u.id = CASE WHEN f.user_low = $1 THEN f.user_high ELSE f.user_low END
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE f.user_low = $1 OR f.user_high = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list friends")?;
        Ok(rows)
    }
}

const CARD_SELECT: &str = r#"
    SELECT u.id, u.email,
           p.data->>'firstName' AS first_name,
           p.data->>'lastName'  AS last_name,
           p.data->>'residence' AS residence
    FROM users u
    LEFT JOIN profiles p ON p.user_id = u.id
"#;

impl UserCardRow {
    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<UserCardRow>> {
        let row = sqlx::query_as::<_, UserCardRow>(&format!("{CARD_SELECT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("select user card")?;
        Ok(row)
    }

    /// Users whose name, email or residence contains `term` (already
    /// lower-cased).
    pub async fn search(db: &PgPool, term: &str) -> anyhow::Result<Vec<UserCardRow>> {
        let rows = sqlx::query_as::<_, UserCardRow>(&format!(
            r#"
            {CARD_SELECT}
            WHERE strpos(lower(concat_ws(' ', p.data->>'firstName', p.data->>'lastName')), $1) > 0
               OR strpos(lower(u.email), $1) > 0
               OR strpos(lower(coalesce(p.data->>'residence', '')), $1) > 0
            ORDER BY u.email
            "#
        ))
        .bind(term)
        .fetch_all(db)
        .await
        .context("search users")?;
        Ok(rows)
    }
}
