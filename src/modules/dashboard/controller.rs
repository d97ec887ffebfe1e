use admitdesk_core::errors::AppError;
use admitdesk_models::dashboard::{DashboardStats, SummaryStats};
use axum::Json;
use axum::extract::State;
use tracing::instrument;

use super::service::DashboardService;
use crate::middleware::auth::AuthAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

/// Headline counts for the admin dashboard
#[utoipa::path(
    get,
    path = "/api/admin/summary-stats",
    responses(
        (status = 200, description = "Summary counts", body = SummaryStats),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
#[instrument(skip(state, _admin))]
pub async fn get_summary_stats(
    State(state): State<AppState>,
    _admin: AuthAdmin,
) -> Result<Json<SummaryStats>, AppError> {
    let stats = DashboardService::summary(state.repos.students.as_ref()).await?;
    Ok(Json(stats))
}

/// Distributions by gender, stream, target, class, test centre and scholarship
#[utoipa::path(
    get,
    path = "/api/admin/dashboard-stats",
    responses(
        (status = 200, description = "Distribution buckets, largest first", body = DashboardStats),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
#[instrument(skip(state, _admin))]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    _admin: AuthAdmin,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = DashboardService::distributions(state.repos.students.as_ref()).await?;
    Ok(Json(stats))
}
