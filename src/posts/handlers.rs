use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CreatePostRequest, DeletedPost, DiningHallFollow, FollowEnvelope, FollowList, FollowRequest, Post,
    PostEnvelope, PostList, PostListQuery, Unfollowed,
};
use super::repo_types::{DiningHall, FollowRow, NewPost, PostRow, PostScope};
use super::services::{clamp_post_limit, owned_post};
use crate::{
    auth::services::AuthUser,
    error::{ApiResult, AppError},
    extract::{ApiJson, ApiPath, ApiQuery},
    meals::repo_types::MealRow,
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/social/posts", get(list_my_posts).post(create_post))
        .route("/social/posts/feed", get(friends_feed))
        .route("/social/posts/feed/dining-halls", get(dining_hall_feed))
        .route("/social/posts/user/:user_id", get(posts_by_user))
        .route("/social/posts/location/:location_id", get(posts_by_location))
        .route("/social/posts/location-name/:location_name", get(posts_by_location_name))
        .route("/social/posts/:id", delete(delete_post))
}

pub fn follow_routes() -> Router<AppState> {
    Router::new()
        .route("/social/dining-halls/follow", post(follow_dining_hall))
        .route("/social/dining-halls/unfollow", post(unfollow_dining_hall))
        .route("/social/dining-halls/following", get(list_followed_halls))
}

async fn list(state: &AppState, scope: PostScope, limit: Option<i64>) -> ApiResult<Json<PostList>> {
    let posts: Vec<Post> = PostRow::list(&state.db, &scope, clamp_post_limit(limit))
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(PostList {
        count: posts.len(),
        posts,
    }))
}

/// POST /social/posts: share one of the caller's meal logs.
#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostEnvelope>)> {
    let meal_id = payload
        .meal_id
        .ok_or_else(|| AppError::invalid_request("mealId is required"))?;
    let meal = MealRow::find(&state.db, user.id, meal_id)
        .await?
        .ok_or_else(|| AppError::not_found("Meal log not found"))?;

    let Some(row) = PostRow::insert(&state.db, &NewPost::from_meal(meal)).await? else {
        warn!(%meal_id, "meal already shared");
        return Err(AppError::conflict("This meal has already been shared"));
    };
    info!(post_id = %row.id, %meal_id, "meal shared");
    Ok((
        StatusCode::CREATED,
        Json(PostEnvelope {
            message: "Post created successfully",
            post: row.into(),
        }),
    ))
}

#[instrument(skip(state, user, q), fields(user_id = %user.id))]
pub async fn list_my_posts(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(q): ApiQuery<PostListQuery>,
) -> ApiResult<Json<PostList>> {
    list(&state, PostScope::Author(user.id), q.limit).await
}

#[instrument(skip(state, user, q), fields(user_id = %user.id))]
pub async fn friends_feed(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(q): ApiQuery<PostListQuery>,
) -> ApiResult<Json<PostList>> {
    list(&state, PostScope::FriendsOf(user.id), q.limit).await
}

#[instrument(skip(state, user, q), fields(user_id = %user.id))]
pub async fn dining_hall_feed(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(q): ApiQuery<PostListQuery>,
) -> ApiResult<Json<PostList>> {
    list(&state, PostScope::HallsFollowedBy(user.id), q.limit).await
}

#[instrument(skip(state, user, q), fields(user_id = %user.id))]
pub async fn posts_by_user(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(author): ApiPath<Uuid>,
    ApiQuery(q): ApiQuery<PostListQuery>,
) -> ApiResult<Json<PostList>> {
    list(&state, PostScope::Author(author), q.limit).await
}

#[instrument(skip(state, user, q), fields(user_id = %user.id))]
pub async fn posts_by_location(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(location_id): ApiPath<String>,
    ApiQuery(q): ApiQuery<PostListQuery>,
) -> ApiResult<Json<PostList>> {
    list(&state, PostScope::LocationId(location_id), q.limit).await
}

#[instrument(skip(state, user, q), fields(user_id = %user.id))]
pub async fn posts_by_location_name(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(location_name): ApiPath<String>,
    ApiQuery(q): ApiQuery<PostListQuery>,
) -> ApiResult<Json<PostList>> {
    list(&state, PostScope::LocationName(location_name), q.limit).await
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeletedPost>> {
    owned_post(PostRow::find(&state.db, id).await?, user.id)?;
    if !PostRow::delete(&state.db, user.id, id).await? {
        return Err(AppError::not_found("Post not found"));
    }
    info!(post_id = %id, "post deleted");
    Ok(Json(DeletedPost {
        message: "Post deleted successfully",
        id,
    }))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn follow_dining_hall(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<FollowRequest>,
) -> ApiResult<(StatusCode, Json<FollowEnvelope>)> {
    let hall = DiningHall::from_request(payload)?;
    let row = FollowRow::insert(&state.db, user.id, &hall)
        .await?
        .ok_or_else(|| AppError::conflict("Already following this dining hall"))?;
    info!(location_id = %hall.location_id, location_name = %hall.location_name, "dining hall followed");
    Ok((
        StatusCode::CREATED,
        Json(FollowEnvelope {
            message: "Dining hall followed successfully",
            follow: row.into(),
        }),
    ))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn unfollow_dining_hall(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<FollowRequest>,
) -> ApiResult<Json<Unfollowed>> {
    let hall = DiningHall::from_request(payload)?;
    if !FollowRow::delete(&state.db, user.id, &hall).await? {
        return Err(AppError::not_found("Not following this dining hall"));
    }
    info!(location_id = %hall.location_id, "dining hall unfollowed");
    Ok(Json(Unfollowed {
        message: "Unfollowed dining hall successfully",
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_followed_halls(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<FollowList>> {
    let dining_halls: Vec<DiningHallFollow> = FollowRow::list(&state.db, user.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(FollowList {
        count: dining_halls.len(),
        dining_halls,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn caller() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "jh@college.harvard.edu".into(),
            roles: vec![],
            first_name: None,
            last_name: None,
            residence: None,
        }
    }

    #[tokio::test]
    async fn sharing_needs_a_meal_id() {
        let err = create_post(State(AppState::fake()), caller(), ApiJson(CreatePostRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(err.message, "mealId is required");
    }

    #[tokio::test]
    async fn following_needs_a_full_hall() {
        let payload = FollowRequest {
            location_id: Some("05".into()),
            location_name: None,
        };
        let err = follow_dining_hall(State(AppState::fake()), caller(), ApiJson(payload))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);

        let err = unfollow_dining_hall(State(AppState::fake()), caller(), ApiJson(FollowRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }
}
