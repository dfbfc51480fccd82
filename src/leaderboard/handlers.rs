use axum::{extract::State, routing::get, Json, Router};
use tracing::{debug, instrument};

use super::dto::{FilterOptions, Leaderboard, LeaderboardFilters, LeaderboardQuery};
use super::repo_types::{FilterOptionsRow, StandingRow};
use super::services::{clamp_limit, rank};
use crate::{auth::services::AuthUser, error::ApiResult, extract::ApiQuery, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .route("/leaderboard/filters", get(get_filter_options))
}

#[instrument(skip(state, user, q), fields(user_id = %user.id))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(q): ApiQuery<LeaderboardQuery>,
) -> ApiResult<Json<Leaderboard>> {
    let filters = LeaderboardFilters::from_query(&q);
    let rows = StandingRow::top(&state.db, &filters, clamp_limit(q.limit)).await?;
    debug!(entries = rows.len(), ?filters, "leaderboard built");
    Ok(Json(Leaderboard {
        leaderboard: rank(rows),
        filters,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_filter_options(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<FilterOptions>> {
    Ok(Json(FilterOptionsRow::load(&state.db).await?.into()))
}
