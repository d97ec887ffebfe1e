use admitdesk_core::errors::AppError;
use admitdesk_models::students::{RegisterStudentResponse, StudentFilter, StudentListResponse};
use anyhow::anyhow;
use axum::Json;
use axum::extract::{Multipart, Query, State, multipart::MultipartError};
use axum::http::StatusCode;
use tracing::instrument;

use super::service::{RegistrationForm, StudentService, UploadedDocument};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

fn multipart_error(e: MultipartError) -> AppError {
    AppError::new(e.status(), anyhow!("{}", e.body_text()))
}

async fn read_form(mut multipart: Multipart) -> Result<RegistrationForm, AppError> {
    let mut form = RegistrationForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "passportPhoto" | "identityPhoto" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
                let document = UploadedDocument {
                    file_name,
                    content_type,
                    bytes,
                };
                if name == "passportPhoto" {
                    form.passport_photo = Some(document);
                } else {
                    form.identity_photo = Some(document);
                }
            }
            _ => {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Register a student
///
/// `multipart/form-data` with the text fields of the registration form and
/// two files, `passportPhoto` and `identityPhoto` (JPEG, PNG or PDF).
#[utoipa::path(
    post,
    path = "/api/students/register",
    request_body(content_type = "multipart/form-data", description = "Registration form and documents"),
    responses(
        (status = 201, description = "Student registered", body = RegisterStudentResponse),
        (status = 400, description = "Malformed multipart body", body = ErrorResponse),
        (status = 403, description = "Registration is closed", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[instrument(skip(state, multipart))]
pub async fn register_student(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<RegisterStudentResponse>), AppError> {
    let form = read_form(multipart).await?;
    let response = StudentService::register(
        state.repos.students.as_ref(),
        state.repos.settings.as_ref(),
        state.storage.as_ref(),
        state.sheets.as_ref(),
        form,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// List students, newest first
#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentFilter),
    responses(
        (status = 200, description = "Matching students", body = StudentListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    Query(filter): Query<StudentFilter>,
) -> Result<Json<StudentListResponse>, AppError> {
    let response = StudentService::list(state.repos.students.as_ref(), &filter).await?;
    Ok(Json(response))
}
