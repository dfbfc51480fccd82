use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    auth::services::AuthUser,
    error::{ApiResult, AppError, ErrorCode},
    extract::ApiJson,
    state::AppState,
};

use super::dto::{ProfileResponse, UserProfile};
use super::repo_types::ProfileRow;

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[derive(Debug, Serialize)]
pub struct ProfileEnvelope {
    pub profile: ProfileResponse,
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ProfileEnvelope>> {
    let row = ProfileRow::find(&state.db, user.id).await?.ok_or_else(|| {
        warn!("profile not found");
        AppError::new(ErrorCode::ProfileNotFound, "User profile not found.")
    })?;
    Ok(Json(ProfileEnvelope {
        profile: row.into(),
    }))
}

#[instrument(skip(state, user, updates), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(mut updates): ApiJson<UserProfile>,
) -> ApiResult<Json<ProfileEnvelope>> {
    // The profile email mirrors the account and is not editable here.
    updates.email = None;
    if updates.is_empty() {
        return Err(AppError::invalid_request("Profile data is required."));
    }

    let row = ProfileRow::merge(&state.db, user.id, &updates).await?;
    info!("profile updated");
    Ok(Json(ProfileEnvelope {
        profile: row.into(),
    }))
}
