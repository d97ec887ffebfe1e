use axum::{Router, routing::get};

use super::controller::{get_dashboard_stats, get_summary_stats};
use crate::state::AppState;

pub fn init_dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/summary-stats", get(get_summary_stats))
        .route("/dashboard-stats", get(get_dashboard_stats))
}
