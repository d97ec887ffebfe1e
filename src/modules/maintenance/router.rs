use axum::{Router, routing::delete};

use super::controller::clear_database;
use crate::state::AppState;

pub fn init_maintenance_router() -> Router<AppState> {
    Router::new().route("/clear-database", delete(clear_database))
}
