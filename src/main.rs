mod app;
mod auth;
mod config;
mod dates;
mod error;
mod extract;
mod friends;
mod huds;
mod leaderboard;
mod meal_plans;
mod meals;
mod nutrition;
mod plans;
mod posts;
mod profile;
mod progress;
mod saved_plans;
mod state;
mod storage;
mod text;

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "crimsonfuel=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    sqlx::migrate!("./migrations")
        .run(&app_state.db)
        .await
        .context("run database migrations")?;

    app::serve(app::build_app(app_state)).await
}
