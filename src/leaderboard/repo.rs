use anyhow::Context;
use sqlx::PgPool;

use super::dto::LeaderboardFilters;
use super::repo_types::{FilterOptionsRow, StandingRow};

/// Class year from the profile, falling back to `classYYYY` in the email.
const CLASS_YEAR: &str =
    r"COALESCE(NULLIF(p.data->>'classYear', ''), substring(u.email from 'class(\d{4})'))";

impl StandingRow {
    /// Users matching `filters`, most posts first. Ties keep sign-up order.
    pub async fn top(db: &PgPool, filters: &LeaderboardFilters, limit: i64) -> anyhow::Result<Vec<StandingRow>> {
        let rows = sqlx::query_as::<_, StandingRow>(&format!(
            r#"
            SELECT u.id AS user_id, u.email,
                   p.data->>'firstName'                   AS first_name,
                   p.data->>'lastName'                    AS last_name,
                   NULLIF(p.data->>'residence', '')       AS residence,
                   NULLIF(p.data->>'dietaryPattern', '')  AS dietary_pattern,
                   {CLASS_YEAR}                           AS class_year,
                   (SELECT COUNT(*) FROM posts po WHERE po.user_id = u.id) AS post_count
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE ($1::text IS NULL OR {CLASS_YEAR} = $1)
              AND ($2::text IS NULL OR p.data->>'residence' = $2)
              AND ($3::text IS NULL OR p.data->>'dietaryPattern' = $3)
            ORDER BY post_count DESC, u.created_at, u.id
            LIMIT $4
            "#
        ))
        .bind(&filters.class_year)
        .bind(&filters.residence)
        .bind(&filters.dietary_pattern)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("select leaderboard")?;
        Ok(rows)
    }
}

impl FilterOptionsRow {
    pub async fn load(db: &PgPool) -> anyhow::Result<FilterOptionsRow> {
        let row = sqlx::query_as::<_, FilterOptionsRow>(&format!(
            r#"
            SELECT
              COALESCE(array_agg(DISTINCT class_year ORDER BY class_year)
                       FILTER (WHERE class_year IS NOT NULL), ARRAY[]::text[]) AS class_years,
              COALESCE(array_agg(DISTINCT residence ORDER BY residence)
                       FILTER (WHERE residence IS NOT NULL), ARRAY[]::text[]) AS residences,
              COALESCE(array_agg(DISTINCT dietary_pattern ORDER BY dietary_pattern)
                       FILTER (WHERE dietary_pattern IS NOT NULL), ARRAY[]::text[]) AS dietary_patterns
            FROM (
                SELECT {CLASS_YEAR}                          AS class_year,
                       NULLIF(p.data->>'residence', '')      AS residence,
                       NULLIF(p.data->>'dietaryPattern', '') AS dietary_pattern
                FROM users u
                LEFT JOIN profiles p ON p.user_id = u.id
            ) s
            "#
        ))
        .fetch_one(db)
        .await
        .context("select leaderboard filter options")?;
        Ok(row)
    }
}

/// These run against the database named by `DATABASE_URL` and return early
/// when it is not set.
#[cfg(test)]
mod db_tests {
    use super::*;
    use uuid::Uuid;

    async fn test_pool() -> Option<PgPool> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping leaderboard query test");
            return None;
        };
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect to DATABASE_URL");
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("apply migrations");
        Some(db)
    }

    async fn student(db: &PgPool, email: &str, profile: serde_json::Value) -> Uuid {
        let id: Uuid = sqlx::query_scalar("INSERT INTO users (email, password_hash) VALUES ($1, 'x') RETURNING id")
            .bind(email)
            .fetch_one(db)
            .await
            .expect("insert user");
        sqlx::query("INSERT INTO profiles (user_id, data) VALUES ($1, $2)")
            .bind(id)
            .bind(sqlx::types::Json(profile))
            .execute(db)
            .await
            .expect("insert profile");
        id
    }

    async fn share(db: &PgPool, user_id: Uuid, times: usize) {
        for _ in 0..times {
            sqlx::query(
                r#"
                INSERT INTO posts (id, user_id, meal_date, meal_type, meal_name,
                                   location_id, totals, eaten_at)
                VALUES ($1, $2, CURRENT_DATE, 'lunch', 'Lunch', '05', '{}'::jsonb, now())
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .execute(db)
            .await
            .expect("insert post");
        }
    }

    #[tokio::test]
    async fn ranks_by_posts_within_filters() {
        let Some(db) = test_pool().await else { return };
        // A house name no other test uses keeps the ranking to this test's users.
        let house = format!("House {}", Uuid::new_v4());
        let tag = Uuid::new_v4();

        let quiet = student(
            &db,
            &format!("quiet.{tag}@college.harvard.edu"),
            serde_json::json!({ "residence": house, "classYear": "2026", "dietaryPattern": "vegan" }),
        )
        .await;
        let busy = student(
            &db,
            &format!("busy.class2027.{tag}@college.harvard.edu"),
            serde_json::json!({ "residence": house, "firstName": "Busy", "dietaryPattern": "vegan" }),
        )
        .await;
        share(&db, quiet, 1).await;
        share(&db, busy, 3).await;

        let by_house = LeaderboardFilters {
            residence: Some(house.clone()),
            ..Default::default()
        };
        let rows = StandingRow::top(&db, &by_house, 10).await.unwrap();
        let order: Vec<(Uuid, i64)> = rows.iter().map(|r| (r.user_id, r.post_count)).collect();
        assert_eq!(order, vec![(busy, 3), (quiet, 1)]);
        assert_eq!(rows[0].class_year.as_deref(), Some("2027"));
        assert_eq!(rows[1].class_year.as_deref(), Some("2026"));

        let by_year = LeaderboardFilters {
            residence: Some(house.clone()),
            class_year: Some("2027".into()),
            ..Default::default()
        };
        let rows = StandingRow::top(&db, &by_year, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, busy);

        let by_diet = LeaderboardFilters {
            residence: Some(house.clone()),
            dietary_pattern: Some("omnivore".into()),
            ..Default::default()
        };
        assert!(StandingRow::top(&db, &by_diet, 10).await.unwrap().is_empty());

        let options = FilterOptionsRow::load(&db).await.unwrap();
        assert!(options.residences.contains(&house));
        assert!(options.class_years.contains(&"2027".to_string()));
        assert!(options.dietary_patterns.contains(&"vegan".to_string()));
    }
}
