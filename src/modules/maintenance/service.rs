use admitdesk_core::errors::AppError;
use admitdesk_db::StudentRepository;
use tracing::instrument;

use super::model::{ClearDatabaseResponse, MessageResponse};
use crate::metrics::track_sheet_sync;
use crate::utils::sheets::SheetMirror;

pub struct MaintenanceService;

impl MaintenanceService {
    #[instrument(skip(students))]
    pub async fn reset_id_counter(
        students: &dyn StudentRepository,
    ) -> Result<MessageResponse, AppError> {
        students.reset_counter().await?;
        tracing::warn!("Student ID counter reset");
        Ok(MessageResponse {
            message: "Student ID counter has been reset to STU0001".to_string(),
        })
    }

    /// Deletes every student, resets the counter and empties the sheet.
    #[instrument(skip(students, sheets))]
    pub async fn clear_database(
        students: &dyn StudentRepository,
        sheets: &dyn SheetMirror,
    ) -> Result<ClearDatabaseResponse, AppError> {
        let deleted = students.delete_all().await?;
        tracing::warn!(deleted, "All student records deleted");

        match sheets.rewrite(&[]).await {
            Ok(()) => track_sheet_sync("rewrite", true),
            Err(e) => {
                track_sheet_sync("rewrite", false);
                tracing::error!(error = %e.error, "Failed to clear sheet");
            }
        }

        Ok(ClearDatabaseResponse {
            success: true,
            message: format!("Deleted {} student record(s).", deleted),
            deleted_count: deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitdesk_db::repos::memory::InMemoryStudentRepository;
    use crate::utils::sheets::NoopSheetMirror;

    #[tokio::test]
    async fn test_clear_on_empty_store() {
        let repo = InMemoryStudentRepository::new();
        let res = MaintenanceService::clear_database(&repo, &NoopSheetMirror)
            .await
            .unwrap();
        assert_eq!(res.deleted_count, 0);
        assert_eq!(repo.sequence().await, 0);
    }

    #[tokio::test]
    async fn test_reset_message() {
        let repo = InMemoryStudentRepository::new();
        let res = MaintenanceService::reset_id_counter(&repo).await.unwrap();
        assert_eq!(res.message, "Student ID counter has been reset to STU0001");
    }
}
