use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::totals::{FormattedTotals, LineItem};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub meal_id: Option<Uuid>,
}

/// A shared meal. The meal fields are a copy taken when it was shared, so
/// later edits to the meal log do not change the post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    /// `None` once the meal log itself has been deleted.
    pub meal_id: Option<Uuid>,
    pub meal_date: Date,
    pub meal_type: String,
    pub meal_name: String,
    pub location_id: String,
    pub location_name: Option<String>,
    pub items: Vec<LineItem>,
    pub totals: FormattedTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "timestamp", with = "time::serde::rfc3339")]
    pub eaten_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PostList {
    pub posts: Vec<Post>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PostEnvelope {
    pub message: &'static str,
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct DeletedPost {
    pub message: &'static str,
    pub id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningHallFollow {
    pub id: Uuid,
    pub location_id: String,
    pub location_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct FollowEnvelope {
    pub message: &'static str,
    pub follow: DiningHallFollow,
}

#[derive(Debug, Serialize)]
pub struct Unfollowed {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowList {
    pub dining_halls: Vec<DiningHallFollow>,
    pub count: usize,
}
