use admitdesk_core::errors::AppError;
use admitdesk_models::settings::{Settings, SettingsResponse, UpdateSettingsDto};
use axum::Json;
use axum::extract::State;
use tracing::instrument;

use super::service::SettingsService;
use crate::middleware::auth::AuthAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Current exam settings
///
/// Public: the registration page shows the exam date and whether
/// registration is open.
#[utoipa::path(
    get,
    path = "/api/admin/exam-settings",
    responses(
        (status = 200, description = "Exam settings", body = Settings),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Settings"
)]
#[instrument(skip(state))]
pub async fn get_exam_settings(State(state): State<AppState>) -> Result<Json<Settings>, AppError> {
    let settings = SettingsService::get(state.repos.settings.as_ref()).await?;
    Ok(Json(settings))
}

/// Update exam settings
#[utoipa::path(
    post,
    path = "/api/admin/exam-settings",
    request_body = UpdateSettingsDto,
    responses(
        (status = 200, description = "Settings updated", body = SettingsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
#[instrument(skip(state, admin), fields(admin = %admin.username()))]
pub async fn update_exam_settings(
    State(state): State<AppState>,
    admin: AuthAdmin,
    ValidatedJson(dto): ValidatedJson<UpdateSettingsDto>,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = SettingsService::update(state.repos.settings.as_ref(), dto).await?;
    Ok(Json(SettingsResponse {
        success: true,
        message: "Exam date updated successfully".to_string(),
        settings,
    }))
}
