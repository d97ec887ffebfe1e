use std::time::Duration;

use admitdesk_config::SmsConfig;
use admitdesk_core::errors::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Sends a one-time code to a 10-digit mobile number.
    async fn send_otp(&self, mobile: &str, otp: &str) -> Result<(), AppError>;
}

#[derive(Debug, Serialize)]
struct SendOtpPayload<'a> {
    route: &'a str,
    variables_values: &'a str,
    numbers: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(rename = "return", default)]
    accepted: bool,
    #[serde(default)]
    message: serde_json::Value,
}

impl GatewayResponse {
    fn message_text(&self) -> String {
        match &self.message {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            _ => "SMS gateway rejected the request".to_string(),
        }
    }
}

/// Fast2SMS-style HTTP gateway authenticated with an API key header.
pub struct HttpSmsGateway {
    client: Client,
    api_url: String,
    api_key: String,
    route: String,
}

impl HttpSmsGateway {
    pub fn new(config: &SmsConfig, api_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::internal_error(format!("Failed to build SMS client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            route: config.route.clone(),
        })
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    #[instrument(skip(self, otp))]
    async fn send_otp(&self, mobile: &str, otp: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("authorization", &self.api_key)
            .json(&SendOtpPayload {
                route: &self.route,
                variables_values: otp,
                numbers: mobile,
            })
            .send()
            .await
            .map_err(|e| AppError::internal_error(format!("Failed to send OTP: {}", e)))?;

        let status = response.status();
        let body: GatewayResponse = response
            .json()
            .await
            .map_err(|e| AppError::internal_error(format!("Invalid SMS gateway response: {}", e)))?;

        if !status.is_success() || !body.accepted {
            tracing::warn!(status = %status, message = %body.message_text(), "SMS gateway rejected OTP");
            return Err(AppError::internal_error(body.message_text()));
        }

        Ok(())
    }
}

/// Writes codes to the log instead of sending them. Used when no API key is
/// configured.
pub struct LogSmsGateway;

#[async_trait]
impl SmsGateway for LogSmsGateway {
    async fn send_otp(&self, mobile: &str, otp: &str) -> Result<(), AppError> {
        tracing::info!(mobile = %mobile, otp = %otp, "SMS gateway not configured, OTP logged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_message_text() {
        let body: GatewayResponse =
            serde_json::from_str(r#"{"return":false,"message":["Invalid Numbers"]}"#).unwrap();
        assert!(!body.accepted);
        assert_eq!(body.message_text(), "Invalid Numbers");

        let body: GatewayResponse =
            serde_json::from_str(r#"{"return":true,"message":"SMS sent successfully."}"#).unwrap();
        assert!(body.accepted);
        assert_eq!(body.message_text(), "SMS sent successfully.");
    }

    #[test]
    fn test_payload_shape() {
        let payload = SendOtpPayload {
            route: "otp",
            variables_values: "123456",
            numbers: "9876543210",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["route"], "otp");
        assert_eq!(json["variables_values"], "123456");
        assert_eq!(json["numbers"], "9876543210");
    }
}
