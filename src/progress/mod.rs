//! Daily and ranged progress against the active nutrition plan.

use crate::state::AppState;
use axum::Router;

pub mod dto;
pub(crate) mod handlers;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
