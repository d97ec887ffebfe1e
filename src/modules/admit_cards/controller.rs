use admitdesk_core::errors::AppError;
use admitdesk_models::StudentId;
use admitdesk_models::admit_cards::{BulkSelectionRequest, GenerateBatchResponse, SendBatchResponse};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use super::service::AdmitCardService;
use crate::middleware::auth::AuthAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Generate admit cards for the selected students
///
/// Already-generated students are skipped. Refused as a whole when the exam
/// date is unset or a selected student has no roll number.
#[utoipa::path(
    post,
    path = "/api/admin/bulk-generate-admit-cards",
    request_body = BulkSelectionRequest,
    responses(
        (status = 200, description = "Batch tally", body = GenerateBatchResponse),
        (status = 400, description = "Empty selection, no exam date or missing roll numbers", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admit Cards"
)]
#[instrument(skip(state, admin, dto), fields(admin = %admin.username(), selected = dto.selected_students.len()))]
pub async fn bulk_generate_admit_cards(
    State(state): State<AppState>,
    admin: AuthAdmin,
    ValidatedJson(dto): ValidatedJson<BulkSelectionRequest>,
) -> Result<Json<GenerateBatchResponse>, AppError> {
    let response = AdmitCardService::generate_batch(
        state.repos.students.as_ref(),
        state.repos.settings.as_ref(),
        &state.admit_card_config,
        &dto.selected_students,
    )
    .await?;
    Ok(Json(response))
}

/// Email admit cards to the selected students
///
/// Students without an email or without a generated card are skipped with a
/// reason, as are provider failures.
#[utoipa::path(
    post,
    path = "/api/admin/bulk-send-admit-cards",
    request_body = BulkSelectionRequest,
    responses(
        (status = 200, description = "Batch tally", body = SendBatchResponse),
        (status = 400, description = "Empty selection", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No matching students found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admit Cards"
)]
#[instrument(skip(state, admin, dto), fields(admin = %admin.username(), selected = dto.selected_students.len()))]
pub async fn bulk_send_admit_cards(
    State(state): State<AppState>,
    admin: AuthAdmin,
    ValidatedJson(dto): ValidatedJson<BulkSelectionRequest>,
) -> Result<Json<SendBatchResponse>, AppError> {
    let response = AdmitCardService::send_batch(
        state.repos.students.as_ref(),
        state.repos.settings.as_ref(),
        state.mailer.as_ref(),
        &state.admit_card_config,
        &dto.selected_students,
    )
    .await?;
    Ok(Json(response))
}

/// Download one admit card as PDF
#[utoipa::path(
    get,
    path = "/api/students/admit-card/{student_id}",
    params(
        ("student_id" = String, Path, description = "Student id, e.g. STU0001")
    ),
    responses(
        (status = 200, description = "Admit card", content_type = "application/pdf", body = Vec<u8>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admit Cards"
)]
#[instrument(skip(state, admin), fields(admin = %admin.username()))]
pub async fn download_admit_card(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(student_id): Path<StudentId>,
) -> Result<Response, AppError> {
    let pdf = AdmitCardService::download(
        state.repos.students.as_ref(),
        state.repos.settings.as_ref(),
        &state.admit_card_config,
        &student_id,
    )
    .await?;

    let disposition = format!("attachment; filename=\"{}.pdf\"", student_id);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}
