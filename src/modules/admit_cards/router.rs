use axum::{Router, routing::post};

use super::controller::{bulk_generate_admit_cards, bulk_send_admit_cards};
use crate::state::AppState;

pub fn init_admit_cards_router() -> Router<AppState> {
    Router::new()
        .route("/bulk-generate-admit-cards", post(bulk_generate_admit_cards))
        .route("/bulk-send-admit-cards", post(bulk_send_admit_cards))
}
