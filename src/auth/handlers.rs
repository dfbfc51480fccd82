use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo_types::User,
        services::{hash_password, is_valid_email, verify_password, AuthUser, JwtKeys, TokenSubject},
    },
    error::{ApiResult, AppError},
    extract::ApiJson,
    profile::{dto::UserProfile, repo_types::ProfileRow},
    state::AppState,
    text::non_blank,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(get_me))
}

/// Builds the token subject from the account plus the names kept on the profile.
async fn subject_for(db: &PgPool, user: &User) -> anyhow::Result<TokenSubject> {
    let profile = ProfileRow::find(db, user.id)
        .await?
        .map(|row| row.data.0)
        .unwrap_or_default();
    Ok(TokenSubject {
        id: user.id,
        email: user.email.clone(),
        roles: user.roles.clone(),
        first_name: profile.first_name,
        last_name: profile.last_name,
        residence: profile.residence,
        token_version: user.token_version,
    })
}

fn issue(keys: &JwtKeys, subject: &TokenSubject) -> ApiResult<AuthResponse> {
    Ok(AuthResponse {
        access_token: keys.sign_access(subject)?,
        refresh_token: keys.sign_refresh(subject)?,
        user: subject.into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::invalid_argument("A valid email is required."));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AppError::invalid_argument(
            "Password must be at least 8 characters.",
        ));
    }

    let hash = hash_password(&payload.password)?;

    let mut tx = state.db.begin().await?;
    let Some(user) = User::create_tx(&mut tx, &payload.email, &hash).await? else {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::conflict("Email is already registered."));
    };
    let profile = UserProfile {
        email: Some(user.email.clone()),
        first_name: non_blank(payload.first_name),
        last_name: non_blank(payload.last_name),
        residence: non_blank(payload.residence),
        ..Default::default()
    };
    ProfileRow::create_tx(&mut tx, user.id, &profile).await?;
    tx.commit().await?;

    let subject = TokenSubject {
        id: user.id,
        email: user.email,
        roles: user.roles,
        first_name: profile.first_name,
        last_name: profile.last_name,
        residence: profile.residence,
        token_version: user.token_version,
    };
    let response = issue(&JwtKeys::from_ref(&state), &subject)?;
    info!(user_id = %subject.id, "user registered");
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();
    let bad_credentials = || AppError::unauthorized("Invalid email or password.");

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::invalid_argument("A valid email is required."));
    }

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(bad_credentials());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(bad_credentials());
    }

    let subject = subject_for(&state.db, &user).await?;
    let response = issue(&JwtKeys::from_ref(&state), &subject)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        AppError::invalid_token()
    })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(AppError::invalid_token)?;
    if user.token_version != claims.ver {
        warn!(user_id = %user.id, "refresh token revoked");
        return Err(AppError::invalid_token());
    }

    let subject = subject_for(&state.db, &user).await?;
    Ok(Json(issue(&keys, &subject)?))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> ApiResult<StatusCode> {
    User::bump_token_version(&state.db, user.id).await?;
    info!("user logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<PublicUser>> {
    let stored = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(AppError::invalid_token)?;

    Ok(Json(PublicUser {
        id: user.id,
        email: stored.email,
        roles: user.roles,
        first_name: user.first_name,
        last_name: user.last_name,
        residence: user.residence,
    }))
}
