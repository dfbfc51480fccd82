use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::dto::{DiningHallFollow, Post};
use crate::nutrition::totals::{FormattedTotals, LineItem};
use crate::text::display_name;

/// Row of `posts` with the author's email and names resolved.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub meal_id: Option<Uuid>,
    pub meal_date: Date,
    pub meal_type: String,
    pub meal_name: String,
    pub location_id: String,
    pub location_name: Option<String>,
    pub items: Json<Vec<LineItem>>,
    pub totals: Json<FormattedTotals>,
    pub image_url: Option<String>,
    pub eaten_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<PostRow> for Post {
    fn from(r: PostRow) -> Self {
        Self {
            user_name: display_name(
                r.user_first_name.as_deref(),
                r.user_last_name.as_deref(),
                &r.user_email,
            ),
            id: r.id,
            user_id: r.user_id,
            user_email: r.user_email,
            user_first_name: r.user_first_name,
            user_last_name: r.user_last_name,
            meal_id: r.meal_id,
            meal_date: r.meal_date,
            meal_type: r.meal_type,
            meal_name: r.meal_name,
            location_id: r.location_id,
            location_name: r.location_name,
            items: r.items.0,
            totals: r.totals.0,
            image_url: r.image_url,
            eaten_at: r.eaten_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Snapshot of a meal log about to be shared.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub meal_id: Uuid,
    pub meal_date: Date,
    pub meal_type: String,
    pub meal_name: String,
    pub location_id: String,
    pub location_name: Option<String>,
    pub items: Vec<LineItem>,
    pub totals: FormattedTotals,
    pub image_url: Option<String>,
    pub eaten_at: OffsetDateTime,
}

/// Which posts a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostScope {
    Author(Uuid),
    /// Posts by the user's friends.
    FriendsOf(Uuid),
    /// Posts at the dining halls the user follows.
    HallsFollowedBy(Uuid),
    LocationId(String),
    LocationName(String),
}

#[derive(Debug, Clone, FromRow)]
pub struct FollowRow {
    pub id: Uuid,
    pub location_id: String,
    pub location_name: String,
    pub created_at: OffsetDateTime,
}

impl From<FollowRow> for DiningHallFollow {
    fn from(r: FollowRow) -> Self {
        Self {
            id: r.id,
            location_id: r.location_id,
            location_name: r.location_name,
            created_at: r.created_at,
        }
    }
}

/// A dining hall is identified by its id and name together; one location
/// number can serve several houses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiningHall {
    pub location_id: String,
    pub location_name: String,
}
