use std::net::SocketAddr;

use axum::{
    http::StatusCode,
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{AppError, ErrorCode};
use crate::state::AppState;
use crate::{
    auth, friends, huds, leaderboard, meal_plans, meals, plans, posts, profile, progress, saved_plans,
};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(profile::router())
                .merge(meals::router())
                .merge(plans::router())
                .merge(progress::router())
                .merge(saved_plans::router())
                .merge(meal_plans::router())
                .merge(huds::router())
                .merge(friends::router())
                .merge(posts::router())
                .merge(leaderboard::router())
                .route("/health", get(|| async { "ok" })),
        )
        .fallback(unknown_route)
        .with_state(state)
        .layer(map_response(method_not_allowed))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

async fn unknown_route() -> AppError {
    AppError::not_found("Route not found")
}

/// Routing-level 405s come back with an empty body; give them the usual
/// error envelope.
async fn method_not_allowed(res: Response) -> Response {
    if res.status() == StatusCode::METHOD_NOT_ALLOWED && !is_json(&res) {
        return AppError::new(ErrorCode::MethodNotAllowed, "Method not allowed").into_response();
    }
    res
}

fn is_json(res: &Response) -> bool {
    res.headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn spawn() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_app(AppState::fake());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn health_is_public() {
        let base = spawn().await;
        let res = reqwest::get(format!("{base}/api/health")).await.unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::OK);
        assert_eq!(res.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn unknown_routes_render_not_found_envelope() {
        let base = spawn().await;
        let res = reqwest::get(format!("{base}/api/nope")).await.unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn wrong_method_renders_envelope() {
        let base = spawn().await;
        let res = reqwest::Client::new()
            .delete(format!("{base}/api/health"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let base = spawn().await;
        let res = reqwest::get(format!("{base}/api/meals")).await.unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn social_routes_require_a_token() {
        let base = spawn().await;
        for path in ["/api/social/posts/feed", "/api/social/friends", "/api/leaderboard"] {
            let res = reqwest::get(format!("{base}{path}")).await.unwrap();
            assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED, "{path}");
        }
    }

    #[tokio::test]
    async fn dining_routes_are_public() {
        let base = spawn().await;
        let res = reqwest::get(format!("{base}/api/huds/locations")).await.unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, serde_json::json!([]));
    }
}
