use admitdesk_core::errors::AppError;
use admitdesk_db::StudentRepository;
use admitdesk_models::dashboard::{DashboardStats, SummaryStats};
use tracing::instrument;

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(students))]
    pub async fn summary(students: &dyn StudentRepository) -> Result<SummaryStats, AppError> {
        Ok(students.summary().await?)
    }

    #[instrument(skip(students))]
    pub async fn distributions(
        students: &dyn StudentRepository,
    ) -> Result<DashboardStats, AppError> {
        Ok(students.distributions().await?)
    }
}
