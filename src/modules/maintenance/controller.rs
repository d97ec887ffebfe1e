use admitdesk_core::errors::AppError;
use axum::Json;
use axum::extract::State;
use tracing::instrument;

use super::model::{ClearDatabaseResponse, MessageResponse};
use super::service::MaintenanceService;
use crate::middleware::auth::AuthAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

/// Reset the student id counter
///
/// The next registration receives `STU0001`. Existing students keep their
/// ids, so a reset on a non-empty table will collide.
#[utoipa::path(
    post,
    path = "/api/students/reset-id-counter",
    responses(
        (status = 200, description = "Counter reset", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Maintenance"
)]
#[instrument(skip(state, admin), fields(admin = %admin.username()))]
pub async fn reset_id_counter(
    State(state): State<AppState>,
    admin: AuthAdmin,
) -> Result<Json<MessageResponse>, AppError> {
    let response = MaintenanceService::reset_id_counter(state.repos.students.as_ref()).await?;
    Ok(Json(response))
}

/// Delete every student record
#[utoipa::path(
    delete,
    path = "/api/admin/clear-database",
    responses(
        (status = 200, description = "Students deleted", body = ClearDatabaseResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Maintenance"
)]
#[instrument(skip(state, admin), fields(admin = %admin.username()))]
pub async fn clear_database(
    State(state): State<AppState>,
    admin: AuthAdmin,
) -> Result<Json<ClearDatabaseResponse>, AppError> {
    let response =
        MaintenanceService::clear_database(state.repos.students.as_ref(), state.sheets.as_ref())
            .await?;
    Ok(Json(response))
}
