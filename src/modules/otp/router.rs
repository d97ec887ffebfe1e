use axum::{Router, routing::post};

use super::controller::{send_otp, verify_otp};
use crate::state::AppState;

pub fn init_otp_router() -> Router<AppState> {
    Router::new()
        .route("/send", post(send_otp))
        .route("/verify", post(verify_otp))
}
