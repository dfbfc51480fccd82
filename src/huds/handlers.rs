use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::client::HudsError;
use super::menu::{group_menu, LocationMenu};
use crate::{
    dates::{parse_iso_date, today_in},
    error::{ApiResult, AppError, ErrorCode},
    extract::{ApiPath, ApiQuery},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuQuery {
    pub date: Option<String>,
    pub location_id: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/huds/locations", get(get_locations))
        .route("/huds/events", get(get_events))
        .route("/huds/menu/today", get(get_today_menu))
        .route("/huds/menu/date", get(get_menu_for_date))
        .route("/huds/recipes/:id", get(get_recipe))
}

fn upstream(err: HudsError) -> AppError {
    warn!(error = %err, "dining api call failed");
    AppError::new(
        ErrorCode::UpstreamUnavailable,
        "Dining service is unavailable",
    )
}

#[instrument(skip_all)]
pub async fn get_locations(State(state): State<AppState>) -> ApiResult<Json<Vec<Value>>> {
    let locations = state.menu.locations().await.map_err(upstream)?;
    Ok(Json(locations))
}

#[instrument(skip_all)]
pub async fn get_events(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<MenuQuery>,
) -> ApiResult<Json<Vec<Value>>> {
    let date = q
        .date
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| parse_iso_date(d, "date"))
        .transpose()?;
    let events = state
        .menu
        .events(date, q.location_id.as_deref())
        .await
        .map_err(upstream)?;
    Ok(Json(events))
}

#[instrument(skip_all)]
pub async fn get_today_menu(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<MenuQuery>,
) -> ApiResult<Json<Vec<LocationMenu>>> {
    let today = today_in(state.config.utc_offset);
    let recipes = state
        .menu
        .recipes(Some(today), q.location_id.as_deref())
        .await
        .map_err(upstream)?;
    let menu = group_menu(recipes);
    info!(%today, locations = menu.len(), "today's menu");
    Ok(Json(menu))
}

#[instrument(skip_all)]
pub async fn get_menu_for_date(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<MenuQuery>,
) -> ApiResult<Json<Vec<LocationMenu>>> {
    let raw = q
        .date
        .as_deref()
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::invalid_request("Date parameter is required"))?;
    let date = parse_iso_date(raw, "date")?;
    let recipes = state
        .menu
        .recipes(Some(date), q.location_id.as_deref())
        .await
        .map_err(upstream)?;
    Ok(Json(group_menu(recipes)))
}

#[instrument(skip_all)]
pub async fn get_recipe(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Value>> {
    if matches!(id.trim(), "" | "." | "..") {
        return Err(AppError::not_found("Recipe not found"));
    }
    match state.menu.recipe(&id).await {
        Ok(recipe) => Ok(Json(recipe)),
        Err(err) if err.is_not_found() => Err(AppError::not_found("Recipe not found")),
        Err(err) => Err(upstream(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use time::{macros::date, Date};

    use crate::huds::client::MenuProvider;

    #[derive(Default)]
    struct StubMenu {
        seen: Mutex<Vec<(Option<Date>, Option<String>)>>,
        fail: bool,
    }

    #[async_trait]
    impl MenuProvider for StubMenu {
        async fn locations(&self) -> Result<Vec<Value>, HudsError> {
            Ok(vec![json!({"location_number": "05", "location_name": "Annenberg"})])
        }
        async fn events(&self, date: Option<Date>, location_id: Option<&str>) -> Result<Vec<Value>, HudsError> {
            self.seen
                .lock()
                .unwrap()
                .push((date, location_id.map(str::to_string)));
            Ok(Vec::new())
        }
        async fn recipes(&self, date: Option<Date>, location_id: Option<&str>) -> Result<Vec<Value>, HudsError> {
            if self.fail {
                return Err(HudsError::Decode("boom".into()));
            }
            self.seen
                .lock()
                .unwrap()
                .push((date, location_id.map(str::to_string)));
            Ok(vec![
                json!({"Location_Number": "05", "Location_Name": "Annenberg", "Meal_Number": 1,
                       "Meal_Name": "Breakfast", "Menu_Category_Number": 3,
                       "Menu_Category_Name": "Entrees", "Recipe_Name": "Eggs"}),
                json!({"Location_Number": "05", "Location_Name": "Annenberg", "Meal_Number": 1,
                       "Meal_Name": "Breakfast", "Menu_Category_Number": 3,
                       "Menu_Category_Name": "Entrees", "Recipe_Name": "Toast"}),
            ])
        }
        async fn recipe(&self, id: &str) -> Result<Value, HudsError> {
            if id == "missing" {
                return Err(HudsError::Status {
                    status: StatusCode::NOT_FOUND,
                    body: String::new(),
                });
            }
            if id == "broken" {
                return Err(HudsError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: String::new(),
                });
            }
            Ok(json!({"ID": id}))
        }
    }

    fn state_with(stub: Arc<StubMenu>) -> AppState {
        AppState::fake().with_menu(stub)
    }

    #[tokio::test]
    async fn menu_for_date_requires_date() {
        let err = get_menu_for_date(
            State(state_with(Arc::new(StubMenu::default()))),
            ApiQuery(MenuQuery::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(err.message, "Date parameter is required");
    }

    #[tokio::test]
    async fn menu_for_date_groups_recipes() {
        let stub = Arc::new(StubMenu::default());
        let Json(menu) = get_menu_for_date(
            State(state_with(stub.clone())),
            ApiQuery(MenuQuery {
                date: Some("2024-03-05".into()),
                location_id: Some("05".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].meals[0].categories[0].recipes.len(), 2);
        assert_eq!(
            stub.seen.lock().unwrap()[0],
            (Some(date!(2024 - 03 - 05)), Some("05".to_string()))
        );
    }

    #[tokio::test]
    async fn events_rejects_malformed_date() {
        let err = get_events(
            State(state_with(Arc::new(StubMenu::default()))),
            ApiQuery(MenuQuery {
                date: Some("03/05/2024".into()),
                location_id: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn upstream_failures_map_to_bad_gateway() {
        let stub = Arc::new(StubMenu {
            fail: true,
            ..Default::default()
        });
        let err = get_today_menu(State(state_with(stub)), ApiQuery(MenuQuery::default()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);
        assert_eq!(err.code.status(), axum::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn recipe_not_found_is_404() {
        let state = state_with(Arc::new(StubMenu::default()));
        let err = get_recipe(State(state.clone()), ApiPath("missing".into()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = get_recipe(State(state.clone()), ApiPath("broken".into()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);

        let err = get_recipe(State(state.clone()), ApiPath("..".into()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let Json(recipe) = get_recipe(State(state), ApiPath("42".into())).await.unwrap();
        assert_eq!(recipe["ID"], "42");
    }

    #[tokio::test]
    async fn locations_pass_through() {
        let Json(locations) = get_locations(State(state_with(Arc::new(StubMenu::default()))))
            .await
            .unwrap();
        assert_eq!(locations[0]["location_name"], "Annenberg");
    }
}
