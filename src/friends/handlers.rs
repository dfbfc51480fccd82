use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    Friend, FriendList, FriendRequest, FriendRequestEnvelope, FriendRequestList, FriendRequestQuery,
    RemovedFriend, SendFriendRequest, UserCard, UserSearchQuery, UserSearchResult,
};
use super::repo_types::{FriendPair, FriendRequestRow, FriendRow, UserCardRow};
use super::services::{answerable_request, check_new_request, clamp_search_limit, search_term, sort_friends};
use crate::{
    auth::services::AuthUser,
    error::{ApiResult, AppError},
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/social/friends", get(list_friends))
        .route("/social/friends/request", post(send_friend_request))
        .route("/social/friends/requests", get(list_friend_requests))
        .route("/social/friends/accept/:id", post(accept_friend_request))
        .route("/social/friends/reject/:id", post(reject_friend_request))
        .route("/social/friends/:friend_id", delete(remove_friend))
        .route("/social/search/users", get(search_users))
}

fn no_longer_pending() -> AppError {
    AppError::invalid_argument("Friend request is no longer pending")
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn send_friend_request(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<SendFriendRequest>,
) -> ApiResult<(StatusCode, Json<FriendRequestEnvelope>)> {
    let to = payload
        .to_user_id
        .ok_or_else(|| AppError::invalid_request("toUserId is required"))?;
    if to == user.id {
        return Err(AppError::invalid_argument("Cannot send friend request to yourself"));
    }
    if UserCardRow::find(&state.db, to).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let already_friends = FriendPair::of(user.id, to).exists(&state.db).await?;
    let pending = FriendRequestRow::pending_between(&state.db, user.id, to).await?;
    check_new_request(user.id, to, already_friends, pending.as_ref())?;

    let Some(row) = FriendRequestRow::insert(&state.db, user.id, to).await? else {
        warn!(to_user_id = %to, "friend request raced with another");
        return Err(AppError::conflict("Friend request already sent"));
    };
    info!(request_id = %row.id, to_user_id = %to, "friend request sent");
    Ok((
        StatusCode::CREATED,
        Json(FriendRequestEnvelope {
            message: None,
            request: FriendRequest::seen_by(row, user.id),
        }),
    ))
}

async fn answer(state: &AppState, user: &AuthUser, id: Uuid, accept: bool) -> ApiResult<FriendRequest> {
    answerable_request(FriendRequestRow::find(&state.db, id).await?, user.id)?;
    let row = FriendRequestRow::resolve(&state.db, id, user.id, accept)
        .await?
        .ok_or_else(no_longer_pending)?;
    info!(request_id = %id, status = %row.status, "friend request answered");
    Ok(FriendRequest::seen_by(row, user.id))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn accept_friend_request(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<FriendRequestEnvelope>> {
    let request = answer(&state, &user, id, true).await?;
    Ok(Json(FriendRequestEnvelope {
        message: Some("Friend request accepted"),
        request,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn reject_friend_request(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<FriendRequestEnvelope>> {
    let request = answer(&state, &user, id, false).await?;
    Ok(Json(FriendRequestEnvelope {
        message: Some("Friend request rejected"),
        request,
    }))
}

#[instrument(skip(state, user, q), fields(user_id = %user.id))]
pub async fn list_friend_requests(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(q): ApiQuery<FriendRequestQuery>,
) -> ApiResult<Json<FriendRequestList>> {
    let requests: Vec<FriendRequest> = FriendRequestRow::pending_for(&state.db, user.id, q.direction)
        .await?
        .into_iter()
        .map(|r| FriendRequest::seen_by(r, user.id))
        .collect();
    Ok(Json(FriendRequestList {
        count: requests.len(),
        requests,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_friends(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<FriendList>> {
    let mut friends: Vec<Friend> = FriendRow::list(&state.db, user.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    sort_friends(&mut friends);
    Ok(Json(FriendList {
        count: friends.len(),
        friends,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_friend(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(friend_id): ApiPath<Uuid>,
) -> ApiResult<Json<RemovedFriend>> {
    if !FriendPair::of(user.id, friend_id).delete(&state.db).await? {
        return Err(AppError::not_found("Friendship not found"));
    }
    info!(%friend_id, "friend removed");
    Ok(Json(RemovedFriend {
        message: "Friend removed successfully",
        id: friend_id,
    }))
}

#[instrument(skip(state, user, q), fields(user_id = %user.id))]
pub async fn search_users(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(q): ApiQuery<UserSearchQuery>,
) -> ApiResult<Json<UserSearchResult>> {
    let term = search_term(q.q)?;
    let limit = clamp_search_limit(q.limit);
    let matches = UserCardRow::search(&state.db, &term).await?;
    let count = matches.len();
    let users: Vec<UserCard> = matches.into_iter().take(limit).map(Into::into).collect();
    Ok(Json(UserSearchResult { users, count }))
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
    async fn friend_request_needs_a_target() {
        let err = send_friend_request(
            State(AppState::fake()),
            caller(),
            ApiJson(SendFriendRequest::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(err.message, "toUserId is required");
    }

    #[tokio::test]
    async fn friend_request_to_self_is_rejected() {
        let user = caller();
        let payload = SendFriendRequest {
            to_user_id: Some(user.id),
        };
        let err = send_friend_request(State(AppState::fake()), user, ApiJson(payload))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn blank_search_is_rejected() {
        let q = UserSearchQuery {
            q: Some("  ".into()),
            limit: None,
        };
        let err = search_users(State(AppState::fake()), caller(), ApiQuery(q))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }
}
