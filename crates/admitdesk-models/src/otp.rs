//! Mobile OTP requests.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendOtpRequest {
    #[serde(default)]
    #[schema(example = "9876543210")]
    pub mobile: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    #[schema(example = "482913")]
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OtpResponse {
    pub success: bool,
    pub message: String,
}
