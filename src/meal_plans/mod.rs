//! Per-day meal plans: one planned dining-hall meal per date and meal type.

use crate::state::AppState;
use axum::Router;

pub mod dto;
mod handlers;
mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
