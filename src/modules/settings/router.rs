use axum::{Router, routing::get};

use super::controller::{get_exam_settings, update_exam_settings};
use crate::state::AppState;

/// Public read of the exam settings.
pub fn init_public_settings_router() -> Router<AppState> {
    Router::new().route("/exam-settings", get(get_exam_settings))
}

/// Settings update; mounted behind the admin token check.
pub fn init_settings_router() -> Router<AppState> {
    Router::new().route("/exam-settings", axum::routing::post(update_exam_settings))
}
