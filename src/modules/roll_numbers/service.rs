use admitdesk_core::errors::AppError;
use admitdesk_db::StudentRepository;
use admitdesk_models::roll_numbers::{GenerateRollNumbersResponse, RollNumberOrder};
use admitdesk_models::students::StudentFilter;
use tokio::sync::Mutex;
use tracing::instrument;

use super::planner::plan_roll_numbers;
use crate::metrics::{track_roll_number_run, track_sheet_sync};
use crate::utils::sheets::SheetMirror;

pub struct RollNumberService;

impl RollNumberService {
    /// Re-derives every roll number, then rewrites the spreadsheet export.
    ///
    /// Runs are serialized by `guard` in this process and by the store's
    /// assignment lock across processes.
    #[instrument(skip(guard, students, sheets))]
    pub async fn generate(
        guard: &Mutex<()>,
        students: &dyn StudentRepository,
        sheets: &dyn SheetMirror,
        order: RollNumberOrder,
    ) -> Result<GenerateRollNumbersResponse, AppError> {
        let _running = guard.lock().await;

        let assignments = students
            .assign_roll_numbers(&|snapshot| {
                plan_roll_numbers(snapshot, order, &mut rand::thread_rng())
            })
            .await?;

        let count = assignments.len();
        tracing::info!(order = order.as_str(), count, "Roll numbers assigned");
        track_roll_number_run(order.as_str(), count);

        Self::sync_sheet(students, sheets).await;

        Ok(GenerateRollNumbersResponse {
            success: true,
            message: format!("Roll numbers generated for {} student(s).", count),
            count,
            order,
        })
    }

    async fn sync_sheet(students: &dyn StudentRepository, sheets: &dyn SheetMirror) {
        let result = match students.list(&StudentFilter::default()).await {
            Ok(all) => sheets.rewrite(&all).await,
            Err(e) => Err(AppError::database(e)),
        };

        match result {
            Ok(()) => track_sheet_sync("rewrite", true),
            Err(e) => {
                track_sheet_sync("rewrite", false);
                tracing::error!(error = %e.error, "Failed to rewrite sheet after roll number run");
            }
        }
    }
}
