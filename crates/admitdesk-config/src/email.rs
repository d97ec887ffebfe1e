use crate::env::{flag, parse_or, string_or};

/// SMTP settings for outgoing admit card mail.
///
/// With `SMTP_ENABLED` unset the server still starts; sends then fail per
/// student and are reported in the batch tally.
#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: flag("SMTP_ENABLED", false),
            smtp_host: string_or("SMTP_HOST", "localhost"),
            smtp_port: parse_or("SMTP_PORT", 1025),
            smtp_username: string_or("SMTP_USERNAME", ""),
            smtp_password: string_or("SMTP_PASSWORD", ""),
            from_email: string_or("FROM_EMAIL", "noreply@admitdesk.local"),
            from_name: string_or("FROM_NAME", "British School - Gurukul"),
        }
    }
}
