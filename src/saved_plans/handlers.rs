use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    CreateSavedPlanRequest, DeletedSavedPlan, SavedMealPlan, SavedPlanEnvelope, SavedPlanList,
    UpdateSavedPlanRequest,
};
use super::repo_types::{NewSavedPlan, SavedPlanChanges, SavedPlanRow};
use super::services::owned_saved_plan;
use crate::{
    auth::services::AuthUser,
    error::{ApiResult, AppError},
    extract::{ApiJson, ApiPath},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/saved-meal-plans", get(list_saved_plans).post(create_saved_plan))
        .route(
            "/saved-meal-plans/:id",
            get(get_saved_plan).put(update_saved_plan).delete(delete_saved_plan),
        )
        .route("/saved-meal-plans/:id/use", post(use_saved_plan))
}

fn gone() -> AppError {
    AppError::not_found("Saved meal plan not found")
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_saved_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateSavedPlanRequest>,
) -> ApiResult<(StatusCode, Json<SavedPlanEnvelope>)> {
    let plan = NewSavedPlan::from_request(payload)?;
    let row = SavedPlanRow::insert(&state.db, user.id, &plan).await?;
    info!(saved_plan_id = %row.id, "saved meal plan created");
    Ok((
        StatusCode::CREATED,
        Json(SavedPlanEnvelope {
            message: "Saved meal plan created successfully",
            saved_plan: row.into(),
        }),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_saved_plans(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<SavedPlanList>> {
    let saved_plans: Vec<SavedMealPlan> = SavedPlanRow::list(&state.db, user.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(SavedPlanList {
        count: saved_plans.len(),
        saved_plans,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_saved_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<SavedMealPlan>> {
    let row = owned_saved_plan(SavedPlanRow::find(&state.db, id).await?, user.id)?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_saved_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateSavedPlanRequest>,
) -> ApiResult<Json<SavedPlanEnvelope>> {
    owned_saved_plan(SavedPlanRow::find(&state.db, id).await?, user.id)?;
    let changes = SavedPlanChanges::from_request(payload)?;
    let row = SavedPlanRow::update(&state.db, user.id, id, &changes)
        .await?
        .ok_or_else(gone)?;
    info!(saved_plan_id = %id, "saved meal plan updated");
    Ok(Json(SavedPlanEnvelope {
        message: "Saved meal plan updated successfully",
        saved_plan: row.into(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn use_saved_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<SavedPlanEnvelope>> {
    owned_saved_plan(SavedPlanRow::find(&state.db, id).await?, user.id)?;
    let row = SavedPlanRow::record_use(&state.db, user.id, id)
        .await?
        .ok_or_else(gone)?;
    info!(saved_plan_id = %id, usage_count = row.usage_count, "saved meal plan used");
    Ok(Json(SavedPlanEnvelope {
        message: "Usage count incremented",
        saved_plan: row.into(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_saved_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeletedSavedPlan>> {
    owned_saved_plan(SavedPlanRow::find(&state.db, id).await?, user.id)?;
    if !SavedPlanRow::delete(&state.db, user.id, id).await? {
        return Err(gone());
    }
    info!(saved_plan_id = %id, "saved meal plan deleted");
    Ok(Json(DeletedSavedPlan {
        message: "Saved meal plan deleted successfully",
        id,
    }))
}
