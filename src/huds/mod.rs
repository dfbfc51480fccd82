//! Read-only proxy over the dining-services menu API.

use crate::state::AppState;
use axum::Router;

pub mod client;
mod handlers;
pub mod menu;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
