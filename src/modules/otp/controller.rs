use admitdesk_core::errors::AppError;
use admitdesk_models::otp::{OtpResponse, SendOtpRequest, VerifyOtpRequest};
use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::otp::service::OtpService;
use crate::state::AppState;

/// Send a one-time code to a mobile number
#[utoipa::path(
    post,
    path = "/api/otp/send",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "OTP sent", body = OtpResponse),
        (status = 400, description = "Invalid mobile number", body = ErrorResponse),
        (status = 429, description = "Too many OTP requests", body = ErrorResponse),
        (status = 500, description = "SMS gateway failure", body = ErrorResponse)
    ),
    tag = "OTP"
)]
#[instrument(skip(state))]
pub async fn send_otp(
    State(state): State<AppState>,
    Json(dto): Json<SendOtpRequest>,
) -> Result<Json<OtpResponse>, AppError> {
    let response = OtpService::send_otp(
        &state.otp_store,
        state.sms.as_ref(),
        &state.rate_limiters.otp,
        &dto.mobile,
    )
    .await?;
    Ok(Json(response))
}

/// Verify a one-time code
#[utoipa::path(
    post,
    path = "/api/otp/verify",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "OTP verified", body = OtpResponse),
        (status = 400, description = "Missing, expired or wrong code", body = ErrorResponse)
    ),
    tag = "OTP"
)]
#[instrument(skip(state, dto), fields(mobile = %dto.mobile))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(dto): Json<VerifyOtpRequest>,
) -> Result<Json<OtpResponse>, AppError> {
    let response = OtpService::verify_otp(&state.otp_store, &dto.mobile, &dto.otp).await?;
    Ok(Json(response))
}
