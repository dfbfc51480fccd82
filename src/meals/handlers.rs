use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CreateMealRequest, DailySummary, DeletedMeal, ListMealsQuery, MealEnvelope, MealList, MealLog,
    UpdateMealRequest, UploadedPhoto,
};
use super::repo_types::{MealChanges, MealFilter, MealRow, NewMeal};
use super::services::{clamp_limit, daily_summary, upload_photo};
use crate::{
    auth::services::AuthUser,
    dates::parse_iso_date,
    error::{ApiResult, AppError},
    extract::{ApiJson, ApiPath, ApiQuery},
    saved_plans::repo_types::SavedPlanRow,
    state::AppState,
};

/// Hard cap on a multipart request; the configured photo limit is checked per file.
const MAX_UPLOAD_BODY: usize = 20 * 1024 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/summary/:date", get(get_daily_summary))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route(
            "/meals/:id",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/photos", post(upload_meal_photo))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY))
}

fn meal_not_found() -> AppError {
    AppError::not_found("Meal log not found")
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_meal(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateMealRequest>,
) -> ApiResult<(StatusCode, Json<MealEnvelope>)> {
    let meal = NewMeal::from_request(&user, payload)?;

    if let Some(plan_id) = meal.saved_plan_id {
        let owned = SavedPlanRow::find(&state.db, plan_id)
            .await?
            .is_some_and(|p| p.user_id == user.id);
        if !owned {
            warn!(%plan_id, "meal references a foreign or missing saved plan");
            return Err(AppError::invalid_argument(
                "savedPlanId must reference one of your saved meal plans.",
            ));
        }
    }

    let row = MealRow::insert(&state.db, &meal).await?;
    info!(meal_id = %row.id, items = meal.items.len(), "meal logged");
    Ok((
        StatusCode::CREATED,
        Json(MealEnvelope {
            message: "Meal logged successfully",
            meal: row.into(),
        }),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_meals(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(q): ApiQuery<ListMealsQuery>,
) -> ApiResult<Json<MealList>> {
    let filter = MealFilter {
        start_date: q
            .start_date
            .as_deref()
            .map(|d| parse_iso_date(d, "startDate"))
            .transpose()?,
        end_date: q
            .end_date
            .as_deref()
            .map(|d| parse_iso_date(d, "endDate"))
            .transpose()?,
        meal_type: q.meal_type.filter(|t| !t.trim().is_empty()),
        limit: clamp_limit(q.limit),
    };

    let meals = MealRow::list(&state.db, user.id, &filter)
        .await?
        .into_iter()
        .map(Into::into)
        .collect::<Vec<_>>();
    Ok(Json(MealList {
        count: meals.len(),
        meals,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_daily_summary(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(date): ApiPath<String>,
) -> ApiResult<Json<DailySummary>> {
    let date = parse_iso_date(&date, "date")?;
    let rows = MealRow::in_range(&state.db, user.id, date, date).await?;
    Ok(Json(daily_summary(date, &rows)))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_meal(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<MealLog>> {
    let row = MealRow::find(&state.db, user.id, id)
        .await?
        .ok_or_else(meal_not_found)?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_meal(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateMealRequest>,
) -> ApiResult<Json<MealEnvelope>> {
    let changes = MealChanges::from_request(payload)?;
    let row = MealRow::update(&state.db, user.id, id, &changes)
        .await?
        .ok_or_else(meal_not_found)?;
    info!(meal_id = %id, items_changed = changes.items.is_some(), "meal updated");
    Ok(Json(MealEnvelope {
        message: "Meal log updated successfully",
        meal: row.into(),
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_meal(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeletedMeal>> {
    if !MealRow::delete(&state.db, user.id, id).await? {
        return Err(meal_not_found());
    }
    info!(meal_id = %id, "meal deleted");
    Ok(Json(DeletedMeal {
        message: "Meal log deleted successfully",
        id,
    }))
}

/// POST /meals/photos (multipart, one image under `photo`, `image` or `file`)
#[instrument(skip(state, user, mp), fields(user_id = %user.id))]
pub async fn upload_meal_photo(
    State(state): State<AppState>,
    user: AuthUser,
    mut mp: Multipart,
) -> ApiResult<(StatusCode, Json<UploadedPhoto>)> {
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        warn!(error = %e, "multipart rejected");
        AppError::invalid_request(format!("Invalid multipart body: {}", e.body_text()))
    };

    while let Some(field) = mp.next_field().await.map_err(bad_form)? {
        if !matches!(field.name(), Some("photo" | "image" | "file")) {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(bad_form)?;
        let photo = upload_photo(&state, user.id, data, &content_type).await?;
        info!(key = %photo.key, "meal photo stored");
        return Ok((StatusCode::CREATED, Json(photo)));
    }

    Err(AppError::invalid_request("A photo file is required."))
}
