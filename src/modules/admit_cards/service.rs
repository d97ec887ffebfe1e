use std::collections::HashSet;
use std::time::Instant;

use admitdesk_config::AdmitCardConfig;
use admitdesk_core::errors::AppError;
use admitdesk_db::{SettingsRepository, StudentRepository};
use admitdesk_models::StudentId;
use admitdesk_models::admit_cards::{
    GenerateBatchOutcome, GenerateBatchResponse, SendBatchOutcome, SendBatchResponse,
    SkippedStudent,
};
use admitdesk_models::settings::ExamDetails;
use admitdesk_models::students::Student;
use anyhow::anyhow;
use chrono::Datelike;
use tracing::instrument;

use super::renderer;
use crate::metrics::{track_admit_card, track_admit_card_rendered};
use crate::utils::email::{Mailer, admit_card_email};

pub const NO_EMAIL: &str = "No email";
pub const NOT_GENERATED: &str = "Admit card not generated";

/// Renders on the blocking pool so a batch never stalls the runtime.
pub async fn render_card(
    student: &Student,
    details: &ExamDetails,
    branding: &AdmitCardConfig,
) -> Result<Vec<u8>, AppError> {
    let (student, details, branding) = (student.clone(), details.clone(), branding.clone());
    let started = Instant::now();

    let pdf = tokio::task::spawn_blocking(move || renderer::render(&student, &details, &branding))
        .await
        .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))??;

    track_admit_card_rendered(started.elapsed().as_secs_f64());
    Ok(pdf)
}

/// Loads the selected students in the order they were picked.
///
/// Duplicates are dropped; ids with no record are logged and ignored.
async fn load_selection(
    students: &dyn StudentRepository,
    ids: &[StudentId],
) -> Result<Vec<Student>, AppError> {
    let mut seen = HashSet::new();
    let ids: Vec<StudentId> = ids.iter().filter(|id| seen.insert(*id)).cloned().collect();

    let mut found = students.find_many(&ids).await?;
    let mut ordered = Vec::with_capacity(found.len());
    for id in &ids {
        match found.iter().position(|s| &s.student_id == id) {
            Some(pos) => ordered.push(found.swap_remove(pos)),
            None => tracing::warn!(student_id = %id, "Selected student not found, ignoring"),
        }
    }
    Ok(ordered)
}

pub struct AdmitCardService;

impl AdmitCardService {
    /// Renders cards for the selected students that do not have one yet.
    ///
    /// The whole batch is refused, with nothing generated, when the exam date
    /// is unset or any selected student lacks a roll number.
    #[instrument(skip(students, settings, branding, ids), fields(selected = ids.len()))]
    pub async fn generate_batch(
        students: &dyn StudentRepository,
        settings: &dyn SettingsRepository,
        branding: &AdmitCardConfig,
        ids: &[StudentId],
    ) -> Result<GenerateBatchResponse, AppError> {
        if ids.is_empty() {
            return Err(AppError::bad_request(anyhow!("No students selected")));
        }

        let settings = settings.get_or_create().await?;
        if !settings.has_exam_date() {
            return Err(AppError::bad_request(anyhow!("Please set the exam date.")));
        }
        let details = settings.exam_details();

        let selection = load_selection(students, ids).await?;
        if selection.iter().any(|s| s.roll_no.is_none()) {
            return Err(AppError::bad_request(anyhow!(
                "Cannot generate admit cards. Please generate roll numbers first."
            )));
        }

        let mut outcome = GenerateBatchOutcome::default();
        for student in selection {
            if student.admit_card_generated {
                continue;
            }

            let result = match render_card(&student, &details, branding).await {
                Ok(_) => students
                    .mark_admit_card_generated(&student.student_id)
                    .await
                    .map_err(AppError::database),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    track_admit_card("generated");
                    outcome.generated_ids.push(student.student_id);
                }
                Err(e) => {
                    track_admit_card("failed");
                    tracing::error!(student_id = %student.student_id, error = %e.error, "Admit card generation failed");
                    outcome
                        .failed
                        .push(SkippedStudent::new(student.student_id, e.error.to_string()));
                }
            }
        }
        outcome.generated_count = outcome.generated_ids.len();

        let message = if outcome.generated_count == 0 && outcome.failed.is_empty() {
            "All selected students already have admit cards.".to_string()
        } else {
            format!("Admit cards generated for {} student(s).", outcome.generated_count)
        };
        tracing::info!(
            generated = outcome.generated_count,
            failed = outcome.failed.len(),
            "Admit card batch generated"
        );

        Ok(GenerateBatchResponse {
            success: true,
            message,
            outcome,
        })
    }

    /// Emails generated cards. Each student either ends up sent or skipped
    /// with a reason; one failure never stops the batch.
    #[instrument(skip(students, settings, mailer, branding, ids), fields(selected = ids.len()))]
    pub async fn send_batch(
        students: &dyn StudentRepository,
        settings: &dyn SettingsRepository,
        mailer: &dyn Mailer,
        branding: &AdmitCardConfig,
        ids: &[StudentId],
    ) -> Result<SendBatchResponse, AppError> {
        if ids.is_empty() {
            return Err(AppError::bad_request(anyhow!("No students selected")));
        }

        let selection = load_selection(students, ids).await?;
        if selection.is_empty() {
            return Err(AppError::not_found(anyhow!("No matching students found.")));
        }

        let details = settings.get_or_create().await?.exam_details();
        let year = chrono::Utc::now().year();

        let mut outcome = SendBatchOutcome::default();
        for student in selection {
            let id = student.student_id.clone();
            match Self::send_one(students, mailer, branding, &details, year, &student).await {
                Ok(()) => {
                    track_admit_card("sent");
                    outcome.sent_ids.push(id);
                }
                Err(reason) => {
                    track_admit_card("skipped");
                    tracing::warn!(student_id = %id, reason = %reason, "Admit card email skipped");
                    outcome.skipped.push(SkippedStudent::new(id, reason));
                }
            }
        }

        tracing::info!(
            sent = outcome.sent_ids.len(),
            skipped = outcome.skipped.len(),
            "Admit card batch sent"
        );

        Ok(SendBatchResponse {
            success: true,
            message: format!("Emails sent successfully to {} students.", outcome.sent_ids.len()),
            outcome,
        })
    }

    /// Returns the skip reason on failure.
    async fn send_one(
        students: &dyn StudentRepository,
        mailer: &dyn Mailer,
        branding: &AdmitCardConfig,
        details: &ExamDetails,
        year: i32,
        student: &Student,
    ) -> Result<(), String> {
        let Some(to) = student.deliverable_email() else {
            return Err(NO_EMAIL.to_string());
        };
        if !student.admit_card_generated {
            return Err(NOT_GENERATED.to_string());
        }

        let pdf = render_card(student, details, branding)
            .await
            .map_err(|e| e.error.to_string())?;
        let email = admit_card_email(branding, student, to, details, year, pdf);
        mailer.send(email).await.map_err(|e| e.error.to_string())?;

        students
            .mark_admit_card_sent(&student.student_id)
            .await
            .map_err(|e| e.to_string())
    }

    /// Renders one card for download and records it as generated.
    #[instrument(skip(students, settings, branding))]
    pub async fn download(
        students: &dyn StudentRepository,
        settings: &dyn SettingsRepository,
        branding: &AdmitCardConfig,
        id: &StudentId,
    ) -> Result<Vec<u8>, AppError> {
        let student = students
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        let details = settings.get_or_create().await?.exam_details();
        let pdf = render_card(&student, &details, branding).await?;

        if !student.admit_card_generated {
            students.mark_admit_card_generated(id).await?;
            track_admit_card("generated");
        }
        Ok(pdf)
    }
}
