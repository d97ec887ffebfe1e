use admitdesk_core::errors::AppError;
use admitdesk_core::file_storage::FileStorage;
use admitdesk_db::{DbError, SettingsRepository, StudentRepository};
use admitdesk_models::students::{
    RegisterStudentDto, RegisterStudentResponse, StudentFilter, StudentListResponse,
};
use anyhow::anyhow;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::metrics::{track_registration, track_sheet_sync};
use crate::utils::sheets::SheetMirror;
use crate::validator::format_errors;

/// One uploaded registration document.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    /// The declared MIME type, or one guessed from the file extension when the
    /// client sent none or a generic one.
    pub fn resolved_content_type(&self) -> String {
        match self.content_type.as_deref() {
            Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
            _ => {
                let ext = self
                    .file_name
                    .as_deref()
                    .and_then(|n| n.rsplit_once('.'))
                    .map(|(_, ext)| ext.to_ascii_lowercase());
                match ext.as_deref() {
                    Some("png") => "image/png",
                    Some("jpg" | "jpeg") => "image/jpeg",
                    Some("pdf") => "application/pdf",
                    _ => "application/octet-stream",
                }
                .to_string()
            }
        }
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

/// Text fields plus the two uploads of a registration form.
#[derive(Debug, Default)]
pub struct RegistrationForm {
    pub fields: std::collections::HashMap<String, String>,
    pub passport_photo: Option<UploadedDocument>,
    pub identity_photo: Option<UploadedDocument>,
}

pub struct StudentService;

impl StudentService {
    /// Validates the form, stores both documents and inserts the student.
    ///
    /// Nothing is written, and no id is allocated, when validation fails.
    /// Stored documents are removed again if the insert fails.
    #[instrument(skip_all)]
    pub async fn register(
        students: &dyn StudentRepository,
        settings: &dyn SettingsRepository,
        storage: &dyn FileStorage,
        sheets: &dyn SheetMirror,
        form: RegistrationForm,
    ) -> Result<RegisterStudentResponse, AppError> {
        let settings = settings.get_or_create().await?;
        if !settings.registration_open {
            return Err(AppError::forbidden("Registration is closed".to_string()));
        }

        let dto = RegisterStudentDto::from_form(&form.fields)
            .map_err(|e| AppError::unprocessable(anyhow!("{}", e.message)))?;
        dto.validate()
            .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))?;

        let passport = form
            .passport_photo
            .ok_or_else(|| AppError::unprocessable(anyhow!("passportPhoto is required")))?;
        let identity = form
            .identity_photo
            .ok_or_else(|| AppError::unprocessable(anyhow!("identityPhoto is required")))?;

        let passport_key = store_document(storage, "passport", &passport).await?;
        let identity_key = match store_document(storage, "identity", &identity).await {
            Ok(key) => key,
            Err(e) => {
                discard(storage, &[&passport_key]).await;
                return Err(e);
            }
        };

        let urls = storage
            .get_url(&passport_key)
            .and_then(|p| storage.get_url(&identity_key).map(|i| (p, i)));
        let (passport_url, identity_url) = match urls {
            Ok(urls) => urls,
            Err(e) => {
                discard(storage, &[&passport_key, &identity_key]).await;
                return Err(AppError::internal(anyhow!("{}", e)));
            }
        };

        let new_student = dto.into_new_student(&settings.venue, passport_url, identity_url);
        let student = match students.create(new_student).await {
            Ok(student) => student,
            Err(e) => {
                discard(storage, &[&passport_key, &identity_key]).await;
                return Err(match e {
                    DbError::Conflict(_) => AppError::conflict(e),
                    e => AppError::database(e),
                });
            }
        };

        tracing::info!(student_id = %student.student_id, stream = %student.stream, "Student registered");
        track_registration(student.stream.as_str());

        match sheets.append(&student).await {
            Ok(()) => track_sheet_sync("append", true),
            Err(e) => {
                track_sheet_sync("append", false);
                tracing::error!(student_id = %student.student_id, error = %e.error, "Failed to append student to sheet");
            }
        }

        Ok(RegisterStudentResponse {
            message: "Registration successful".to_string(),
            student_id: student.student_id.clone(),
            student,
        })
    }

    #[instrument(skip(students))]
    pub async fn list(
        students: &dyn StudentRepository,
        filter: &StudentFilter,
    ) -> Result<StudentListResponse, AppError> {
        let data = students.list(filter).await?;
        Ok(StudentListResponse {
            success: true,
            data,
        })
    }
}

async fn store_document(
    storage: &dyn FileStorage,
    folder: &str,
    document: &UploadedDocument,
) -> Result<String, AppError> {
    let content_type = document.resolved_content_type();
    let key = format!(
        "{}/student_{}.{}",
        folder,
        Uuid::new_v4().simple(),
        extension_for(&content_type)
    );

    storage
        .save(&key, &document.bytes, &content_type)
        .await
        .map_err(|e| {
            if e.is_client_error() {
                AppError::unprocessable(anyhow!("{}: {}", folder_field(folder), e))
            } else {
                AppError::internal(anyhow!("Failed to store {}: {}", folder_field(folder), e))
            }
        })
}

fn folder_field(folder: &str) -> &'static str {
    if folder == "passport" {
        "passportPhoto"
    } else {
        "identityPhoto"
    }
}

async fn discard(storage: &dyn FileStorage, keys: &[&str]) {
    for key in keys {
        if let Err(e) = storage.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to remove orphaned upload");
        }
    }
}
