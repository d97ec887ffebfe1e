use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{get_students, register_student};
use crate::modules::admit_cards::controller::download_admit_card;
use crate::modules::maintenance::controller::reset_id_counter;
use crate::state::AppState;

/// Registration. `max_upload` bounds each document, the body may carry two
/// plus the text fields.
pub fn init_public_students_router(max_upload: usize) -> Router<AppState> {
    Router::new().route(
        "/register",
        post(register_student).layer(DefaultBodyLimit::max(max_upload * 2 + 1024 * 1024)),
    )
}

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_students))
        .route("/admit-card/{student_id}", get(download_admit_card))
        .route("/reset-id-counter", post(reset_id_counter))
}
