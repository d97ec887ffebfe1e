//! Exam settings.
//!
//! A single settings row exists per deployment. It is created with defaults
//! the first time anything reads it.

use admitdesk_core::dates::format_ddmmyyyy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_VENUE: &str =
    "British School Gurukul, Near Chopra Agencies, South Bisar Tank, Gaya (Bihar)";
pub const DEFAULT_EXAM_TIME: &str = "09:00 AM - 11:00 AM";
pub const DEFAULT_REPORTING_TIME: &str = "08:00 AM";

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// ISO date as entered by the admin, e.g. `2025-03-09`.
    pub exam_date: Option<String>,
    pub last_date_to_register: Option<String>,
    pub result_date: Option<String>,
    pub registration_open: bool,
    pub venue: String,
    pub exam_time: String,
    pub reporting_time: String,
    pub updated_at: DateTime<Utc>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exam_date: None,
            last_date_to_register: None,
            result_date: None,
            registration_open: true,
            venue: DEFAULT_VENUE.to_string(),
            exam_time: DEFAULT_EXAM_TIME.to_string(),
            reporting_time: DEFAULT_REPORTING_TIME.to_string(),
            updated_at: Utc::now(),
        }
    }
}

impl Settings {
    pub fn has_exam_date(&self) -> bool {
        self.exam_date.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    /// Exam details as printed on admit cards and in emails.
    pub fn exam_details(&self) -> ExamDetails {
        ExamDetails {
            exam_date: format_ddmmyyyy(self.exam_date.as_deref()),
            venue: self.venue.clone(),
            exam_time: self.exam_time.clone(),
            reporting_time: self.reporting_time.clone(),
        }
    }

    /// Applies the supplied fields of `update`. An empty `examDate` clears it.
    pub fn apply(&mut self, update: UpdateSettingsDto) {
        fn date(value: String) -> Option<String> {
            let value = value.trim().to_string();
            (!value.is_empty()).then_some(value)
        }

        if let Some(v) = update.exam_date {
            self.exam_date = date(v);
        }
        if let Some(v) = update.last_date_to_register {
            self.last_date_to_register = date(v);
        }
        if let Some(v) = update.result_date {
            self.result_date = date(v);
        }
        if let Some(v) = update.registration_open {
            self.registration_open = v;
        }
        if let Some(v) = update.venue {
            self.venue = v;
        }
        if let Some(v) = update.exam_time {
            self.exam_time = v;
        }
        if let Some(v) = update.reporting_time {
            self.reporting_time = v;
        }
        self.updated_at = Utc::now();
    }
}

/// Exam details with the date already formatted as `DD/MM/YYYY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamDetails {
    pub exam_date: String,
    pub venue: String,
    pub exam_time: String,
    pub reporting_time: String,
}

/// Partial settings update. Omitted fields are left unchanged.
#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsDto {
    #[schema(example = "2025-03-09")]
    pub exam_date: Option<String>,
    pub last_date_to_register: Option<String>,
    pub result_date: Option<String>,
    pub registration_open: Option<bool>,
    #[validate(length(min = 1, message = "venue cannot be empty"))]
    pub venue: Option<String>,
    #[validate(length(min = 1, message = "examTime cannot be empty"))]
    pub exam_time: Option<String>,
    #[validate(length(min = 1, message = "reportingTime cannot be empty"))]
    pub reporting_time: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SettingsResponse {
    pub success: bool,
    pub message: String,
    pub settings: Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.registration_open);
        assert!(!settings.has_exam_date());
        assert_eq!(settings.exam_details().exam_date, "Not Set");
        assert_eq!(settings.venue, DEFAULT_VENUE);
    }

    #[test]
    fn test_apply_is_partial() {
        let mut settings = Settings::default();
        settings.apply(UpdateSettingsDto {
            exam_date: Some("2025-03-09".into()),
            ..Default::default()
        });
        assert_eq!(settings.exam_date.as_deref(), Some("2025-03-09"));
        assert_eq!(settings.exam_details().exam_date, "09/03/2025");
        assert!(settings.registration_open);

        settings.apply(UpdateSettingsDto {
            registration_open: Some(false),
            ..Default::default()
        });
        assert_eq!(settings.exam_date.as_deref(), Some("2025-03-09"));
        assert!(!settings.registration_open);
    }

    #[test]
    fn test_empty_exam_date_clears() {
        let mut settings = Settings::default();
        settings.exam_date = Some("2025-03-09".into());
        settings.apply(UpdateSettingsDto {
            exam_date: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(settings.exam_date, None);
    }
}
