use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    DeletedPlan, HistoryQuery, PersonalizedResponse, PlanEnvelope, PlanHistory, PlanRequest,
    PlanResponse,
};
use super::repo_types::{PlanInput, PlanRow};
use super::services::history_limit;
use crate::{
    auth::services::AuthUser,
    dates::today_in,
    error::{ApiResult, AppError, ErrorCode},
    extract::{ApiJson, ApiPath, ApiQuery},
    nutrition::planner::recommend,
    profile::repo_types::ProfileRow,
    progress::handlers::get_today_progress,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition-plan", get(get_active_plan).post(create_plan))
        .route("/nutrition-plan/history", get(get_plan_history))
        .route("/nutrition-plan/personalized", get(get_personalized_plan))
        .route("/nutrition-plan/progress/today", get(get_today_progress))
        .route(
            "/nutrition-plan/:id",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
}

fn plan_not_found() -> AppError {
    AppError::new(ErrorCode::PlanNotFound, "Nutrition plan not found.")
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<PlanRequest>,
) -> ApiResult<(StatusCode, Json<PlanEnvelope>)> {
    let input = PlanInput::from_request(payload)?;
    let row = PlanRow::create_active(&state.db, user.id, &input).await?;
    info!(plan_id = %row.id, metrics = input.metrics.len(), "nutrition plan created");
    Ok((
        StatusCode::CREATED,
        Json(PlanEnvelope {
            message: "Nutrition plan created successfully",
            plan: row.into(),
        }),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_active_plan(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<PlanResponse>> {
    let plan = PlanRow::find_active(&state.db, user.id).await?;
    Ok(Json(PlanResponse {
        plan: plan.map(Into::into),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_plan_history(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(q): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<PlanHistory>> {
    let rows = PlanRow::history(&state.db, user.id, history_limit(q.limit)).await?;
    Ok(Json(PlanHistory {
        plans: rows.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_personalized_plan(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<PersonalizedResponse>> {
    let Some(profile) = ProfileRow::find(&state.db, user.id).await? else {
        warn!("profile not found");
        return Err(AppError::new(
            ErrorCode::ProfileNotFound,
            "User profile not found. Please complete your profile.",
        ));
    };

    let today = today_in(state.config.utc_offset);
    let recommendation = recommend(&profile.data.0, today).ok_or_else(|| {
        warn!("profile incomplete for recommendation");
        AppError::new(
            ErrorCode::InsufficientData,
            "Insufficient profile data to generate personalized plan. Please complete your profile.",
        )
    })?;
    info!(preset = recommendation.suggested_preset, tdee = recommendation.tdee, "plan recommended");
    Ok(Json(PersonalizedResponse { recommendation }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<PlanResponse>> {
    let row = PlanRow::find(&state.db, user.id, id)
        .await?
        .ok_or_else(plan_not_found)?;
    Ok(Json(PlanResponse {
        plan: Some(row.into()),
    }))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PlanRequest>,
) -> ApiResult<Json<PlanEnvelope>> {
    let input = PlanInput::from_request(payload)?;
    let row = PlanRow::replace(&state.db, user.id, id, &input)
        .await?
        .ok_or_else(plan_not_found)?;
    info!(plan_id = %id, "nutrition plan updated");
    Ok(Json(PlanEnvelope {
        message: "Nutrition plan updated successfully",
        plan: row.into(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeletedPlan>> {
    if !PlanRow::delete(&state.db, user.id, id).await? {
        return Err(plan_not_found());
    }
    info!(plan_id = %id, "nutrition plan deleted");
    Ok(Json(DeletedPlan {
        message: "Nutrition plan deleted successfully",
        id,
    }))
}
