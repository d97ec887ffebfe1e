use crate::env::{optional, string_or};

/// SMS gateway settings used for OTP delivery.
///
/// Without an API key codes are only written to the log, which is what local
/// development wants.
#[derive(Clone, Debug)]
pub struct SmsConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub route: String,
}

impl SmsConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: string_or("SMS_API_URL", "https://www.fast2sms.com/dev/bulkV2"),
            api_key: optional("SMS_API_KEY"),
            route: string_or("SMS_ROUTE", "otp"),
        }
    }
}
