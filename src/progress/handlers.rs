use axum::{extract::State, routing::get, Json, Router};
use tracing::{debug, instrument};

use super::dto::{NoActivePlan, PlanProgress, RangeProgress, RangeQuery, TodayProgress};
use super::services::{range_report, today_report};
use crate::{
    auth::services::AuthUser,
    dates::{parse_iso_date, today_in},
    error::{ApiResult, AppError},
    extract::ApiQuery,
    meals::repo_types::MealRow,
    plans::repo_types::PlanRow,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition-progress/today", get(get_today_progress))
        .route("/nutrition-progress/range", get(get_range_progress))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_today_progress(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<PlanProgress<TodayProgress>>> {
    let Some(plan) = PlanRow::find_active(&state.db, user.id).await? else {
        debug!("no active plan");
        return Ok(Json(PlanProgress::Inactive(NoActivePlan::default())));
    };

    let today = today_in(state.config.utc_offset);
    let rows = MealRow::in_range(&state.db, user.id, today, today).await?;
    Ok(Json(PlanProgress::Active(today_report(&plan.into(), today, &rows))))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_range_progress(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(q): ApiQuery<RangeQuery>,
) -> ApiResult<Json<PlanProgress<RangeProgress>>> {
    let (Some(start), Some(end)) = (q.start, q.end) else {
        return Err(AppError::invalid_request(
            "start and end query parameters are required",
        ));
    };
    let start = parse_iso_date(&start, "start")?;
    let end = parse_iso_date(&end, "end")?;
    if start > end {
        return Err(AppError::invalid_request(
            "start date must be on or before end date",
        ));
    }

    let Some(plan) = PlanRow::find_active(&state.db, user.id).await? else {
        debug!("no active plan");
        return Ok(Json(PlanProgress::Inactive(NoActivePlan::default())));
    };

    let rows = MealRow::in_range(&state.db, user.id, start, end).await?;
    debug!(meals = rows.len(), %start, %end, "range loaded");
    Ok(Json(PlanProgress::Active(range_report(&plan.into(), start, end, rows))))
}
