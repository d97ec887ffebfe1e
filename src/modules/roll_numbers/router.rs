use axum::{Router, routing::post};

use super::controller::generate_roll_numbers;
use crate::state::AppState;

pub fn init_roll_numbers_router() -> Router<AppState> {
    Router::new().route("/generate-rollno", post(generate_roll_numbers))
}
