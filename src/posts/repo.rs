use anyhow::Context;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::repo_types::{DiningHall, FollowRow, NewPost, PostRow, PostScope};

const POST_SELECT: &str = r#"
    SELECT p.id, p.user_id,
           u.email                AS user_email,
           pr.data->>'firstName'  AS user_first_name,
           pr.data->>'lastName'   AS user_last_name,
           p.meal_id, p.meal_date, p.meal_type, p.meal_name,
           p.location_id, p.location_name, p.items, p.totals, p.image_url,
           p.eaten_at, p.created_at, p.updated_at
    FROM posts p
    JOIN users u ON u.id = p.user_id
    LEFT JOIN profiles pr ON pr.user_id = p.user_id
"#;

const FOLLOW_COLUMNS: &str = "id, location_id, location_name, created_at";

impl PostScope {
    /// Filter on `posts p`; `$1` is the scope's key.
    fn condition(&self) -> &'static str {
        match self {
            PostScope::Author(_) => "p.user_id = $1",
            PostScope::FriendsOf(_) => {
                r#"p.user_id IN (
                    SELECT CASE WHEN f.user_low = $1 THEN f.user_high ELSE f.user_low END
                    FROM friendships f
                    WHERE f.user_low = $1 OR f.user_high = $1)"#
            }
            PostScope::HallsFollowedBy(_) => {
                r#"EXISTS (
                    SELECT 1 FROM dining_hall_follows d
                    WHERE d.user_id = $1
                      AND d.location_id = p.location_id
                      AND d.location_name = p.location_name)"#
            }
            PostScope::LocationId(_) => "p.location_id = $1",
            PostScope::LocationName(_) => "p.location_name = $1",
        }
    }
}

impl PostRow {
    /// Shares a meal; `None` when that meal has already been shared.
    pub async fn insert(db: &PgPool, post: &NewPost) -> anyhow::Result<Option<PostRow>> {
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO posts (id, user_id, meal_id, meal_date, meal_type, meal_name,
                               location_id, location_name, items, totals, image_url, eaten_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (meal_id) WHERE meal_id IS NOT NULL DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.user_id)
        .bind(post.meal_id)
        .bind(post.meal_date)
        .bind(&post.meal_type)
        .bind(&post.meal_name)
        .bind(&post.location_id)
        .bind(&post.location_name)
        .bind(Json(&post.items))
        .bind(Json(&post.totals))
        .bind(&post.image_url)
        .bind(post.eaten_at)
        .fetch_optional(db)
        .await
        .context("insert post")?;

        match id {
            Some(id) => Self::find(db, id).await,
            None => Ok(None),
        }
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("select post")?;
        Ok(row)
    }

    /// Newest first by meal time.
    pub async fn list(db: &PgPool, scope: &PostScope, limit: i64) -> anyhow::Result<Vec<PostRow>> {
        let sql = format!(
            r#"
            {POST_SELECT}
            WHERE {}
            ORDER BY p.eaten_at DESC, p.created_at DESC
            LIMIT $2
            "#,
            scope.condition()
        );
        let query = sqlx::query_as::<_, PostRow>(&sql);
        let query = match scope {
            PostScope::Author(id) | PostScope::FriendsOf(id) | PostScope::HallsFollowedBy(id) => {
                query.bind(*id)
            }
            PostScope::LocationId(key) | PostScope::LocationName(key) => query.bind(key.as_str()),
        };
        let rows = query
            .bind(limit)
            .fetch_all(db)
            .await
            .context("list posts")?;
        Ok(rows)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete post")?;
        Ok(result.rows_affected() > 0)
    }
}

impl FollowRow {
    /// `None` when the user already follows that hall.
    pub async fn insert(db: &PgPool, user_id: Uuid, hall: &DiningHall) -> anyhow::Result<Option<FollowRow>> {
        let row = sqlx::query_as::<_, FollowRow>(&format!(
            r#"
            INSERT INTO dining_hall_follows (id, user_id, location_id, location_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, location_id, location_name) DO NOTHING
            RETURNING {FOLLOW_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&hall.location_id)
        .bind(&hall.location_name)
        .fetch_optional(db)
        .await
        .context("insert dining hall follow")?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, hall: &DiningHall) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM dining_hall_follows
             WHERE user_id = $1 AND location_id = $2 AND location_name = $3
            "#,
        )
        .bind(user_id)
        .bind(&hall.location_id)
        .bind(&hall.location_name)
        .execute(db)
        .await
        .context("delete dining hall follow")?;
        Ok(result.rows_affected() > 0)
    }

    /// Followed halls by name.
    pub async fn list(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FollowRow>> {
        let rows = sqlx::query_as::<_, FollowRow>(&format!(
            r#"
            SELECT {FOLLOW_COLUMNS}
            FROM dining_hall_follows
            WHERE user_id = $1
            ORDER BY lower(location_name), location_id
            "#
        ))
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list dining hall follows")?;
        Ok(rows)
    }
}
