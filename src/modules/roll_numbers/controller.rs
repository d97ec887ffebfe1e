use admitdesk_core::errors::AppError;
use admitdesk_models::roll_numbers::{GenerateRollNumbersRequest, GenerateRollNumbersResponse};
use axum::Json;
use axum::extract::State;
use tracing::instrument;

use super::service::RollNumberService;
use crate::middleware::auth::AuthAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Assign roll numbers per stream
///
/// `order` is `alphabetical` (default) or `random`. Every run renumbers all
/// students, so an empty body `{}` is the usual request.
#[utoipa::path(
    post,
    path = "/api/admin/generate-rollno",
    request_body = GenerateRollNumbersRequest,
    responses(
        (status = 200, description = "Roll numbers assigned", body = GenerateRollNumbersResponse),
        (status = 400, description = "Invalid order", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Roll Numbers"
)]
#[instrument(skip(state, admin), fields(admin = %admin.username()))]
pub async fn generate_roll_numbers(
    State(state): State<AppState>,
    admin: AuthAdmin,
    ValidatedJson(dto): ValidatedJson<GenerateRollNumbersRequest>,
) -> Result<Json<GenerateRollNumbersResponse>, AppError> {
    let response = RollNumberService::generate(
        &state.roll_number_guard,
        state.repos.students.as_ref(),
        state.sheets.as_ref(),
        dto.order,
    )
    .await?;
    Ok(Json(response))
}
