use sqlx::FromRow;
use uuid::Uuid;

use super::dto::FilterOptions;

/// One user with their post count, before ranking.
#[derive(Debug, Clone, FromRow)]
pub struct StandingRow {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub residence: Option<String>,
    pub dietary_pattern: Option<String>,
    /// From the profile, else the `classYYYY` part of the email.
    pub class_year: Option<String>,
    pub post_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct FilterOptionsRow {
    pub class_years: Vec<String>,
    pub residences: Vec<String>,
    pub dietary_patterns: Vec<String>,
}

impl From<FilterOptionsRow> for FilterOptions {
    fn from(r: FilterOptionsRow) -> Self {
        Self {
            class_years: r.class_years,
            residences: r.residences,
            dietary_patterns: r.dietary_patterns,
        }
    }
}
