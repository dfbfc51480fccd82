use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CreateMealPlanRequest, DeletedMealPlan, MealPlan, MealPlanList, MealPlanRangeQuery,
    UpdateMealPlanRequest,
};
use super::repo::is_unique_violation;
use super::repo_types::{MealPlanChanges, MealPlanRow, NewMealPlan};
use super::services::owned_meal_plan;
use crate::{
    auth::services::AuthUser,
    dates::parse_iso_date,
    error::{ApiResult, AppError},
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans", get(list_meal_plans).post(create_meal_plan))
        .route(
            "/meal-plans/:id",
            get(get_meal_plan).put(update_meal_plan).delete(delete_meal_plan),
        )
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_meal_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateMealPlanRequest>,
) -> ApiResult<(StatusCode, Json<MealPlan>)> {
    let plan = NewMealPlan::from_request(payload)?;
    let row = MealPlanRow::upsert(&state.db, user.id, &plan).await?;
    info!(meal_plan_id = %row.id, date = %row.plan_date, meal_type = %plan.meal_type, "meal plan saved");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_meal_plans(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(q): ApiQuery<MealPlanRangeQuery>,
) -> ApiResult<Json<MealPlanList>> {
    let (Some(start), Some(end)) = (q.start_date, q.end_date) else {
        return Err(AppError::invalid_request(
            "startDate and endDate query parameters are required",
        ));
    };
    let start = parse_iso_date(&start, "startDate")?;
    let end = parse_iso_date(&end, "endDate")?;

    let rows = MealPlanRow::list_range(&state.db, user.id, start, end).await?;
    Ok(Json(MealPlanList {
        meal_plans: rows.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_meal_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MealPlan>> {
    let row = owned_meal_plan(MealPlanRow::find(&state.db, id).await?, user.id)?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_meal_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateMealPlanRequest>,
) -> ApiResult<Json<MealPlan>> {
    owned_meal_plan(MealPlanRow::find(&state.db, id).await?, user.id)?;
    let changes = MealPlanChanges::from_request(payload)?;

    let row = match MealPlanRow::update(&state.db, user.id, id, &changes).await {
        Ok(Some(row)) => row,
        Ok(None) => return Err(AppError::not_found("Meal plan not found")),
        Err(e) if is_unique_violation(&e) => {
            warn!(meal_plan_id = %id, "meal plan slot already taken");
            return Err(AppError::conflict(
                "A meal plan already exists for that date and meal type.",
            ));
        }
        Err(e) => return Err(e.into()),
    };
    info!(meal_plan_id = %id, "meal plan updated");
    Ok(Json(row.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_meal_plan(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeletedMealPlan>> {
    owned_meal_plan(MealPlanRow::find(&state.db, id).await?, user.id)?;
    if !MealPlanRow::delete(&state.db, user.id, id).await? {
        return Err(AppError::not_found("Meal plan not found"));
    }
    info!(meal_plan_id = %id, "meal plan deleted");
    Ok(Json(DeletedMealPlan { success: true, id }))
}
