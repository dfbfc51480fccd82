use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;

use super::dto::{ProfileResponse, UserProfile};

/// Row of the `profiles` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub data: Json<UserProfile>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<ProfileRow> for ProfileResponse {
    fn from(row: ProfileRow) -> Self {
        Self {
            profile: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
