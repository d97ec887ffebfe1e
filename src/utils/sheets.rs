//! Write-only spreadsheet export of registrations.
//!
//! New registrations are appended one row at a time. After roll numbers are
//! assigned the whole sheet is rewritten: the header, PCM students by roll
//! number, three blank rows, then PCB students by roll number.

use std::time::{Duration, Instant};

use admitdesk_config::SheetsConfig;
use admitdesk_core::errors::AppError;
use admitdesk_models::students::{Stream, Student};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::instrument;

pub const HEADERS: [&str; 23] = [
    "Submission Timestamp",
    "Roll No",
    "Student ID",
    "Student Name",
    "Email",
    "Gender",
    "Class Moving",
    "Date of Birth",
    "Stream",
    "Target",
    "Father Name",
    "Mother Name",
    "Permanent Address",
    "Present Address",
    "Parent Mobile",
    "Student Mobile",
    "Whatsapp Mobile",
    "Previous School",
    "Previous Percentage",
    "Scholarship Offered",
    "Scholarship Details",
    "Passport Photo URL",
    "Identity Photo URL",
];

const SEPARATOR_ROWS: usize = 3;

pub fn header_row() -> Vec<String> {
    HEADERS.iter().map(|h| h.to_string()).collect()
}

pub fn student_row(s: &Student) -> Vec<String> {
    vec![
        s.created_at.format("%d/%m/%Y, %H:%M:%S").to_string(),
        s.roll_no.map(|r| r.to_string()).unwrap_or_default(),
        s.student_id.to_string(),
        s.student_name.clone(),
        s.email.clone().unwrap_or_default(),
        s.gender.to_string(),
        s.class_moving.to_string(),
        s.date_of_birth
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        s.stream.to_string(),
        s.target.to_string(),
        s.father_name.clone(),
        s.mother_name.clone(),
        s.permanent_address.clone(),
        s.present_address.clone(),
        s.parent_mobile.clone(),
        s.student_mobile.clone().unwrap_or_default(),
        s.whatsapp_mobile.clone().unwrap_or_default(),
        s.previous_school.clone(),
        s.previous_result_percentage.to_string(),
        if s.scholarship_offered { "Yes" } else { "No" }.to_string(),
        s.scholarship_details.clone().unwrap_or_default(),
        s.passport_photo_url.clone(),
        s.identity_photo_url.clone(),
    ]
}

/// Full sheet contents with PCM and PCB blocks separated by blank rows.
///
/// Within a block students are ordered by roll number; students without one
/// go last, by id.
pub fn stream_separated_rows(students: &[Student]) -> Vec<Vec<String>> {
    let block = |stream: Stream| {
        let mut members: Vec<&Student> = students.iter().filter(|s| s.stream == stream).collect();
        members.sort_by(|a, b| {
            let key = |s: &Student| (s.roll_no.is_none(), s.roll_no, s.student_id.sequence());
            key(a).cmp(&key(b))
        });
        members.into_iter().map(student_row).collect::<Vec<_>>()
    };

    let blank = vec![String::new(); HEADERS.len()];

    let mut rows = vec![header_row()];
    rows.extend(block(Stream::Pcm));
    rows.extend(std::iter::repeat_n(blank, SEPARATOR_ROWS));
    rows.extend(block(Stream::Pcb));
    rows
}

#[async_trait]
pub trait SheetMirror: Send + Sync {
    /// Appends one registration, writing the header first if the sheet is empty.
    async fn append(&self, student: &Student) -> Result<(), AppError>;

    /// Replaces the sheet with [`stream_separated_rows`].
    async fn rewrite(&self, students: &[Student]) -> Result<(), AppError>;
}

/// Used when no spreadsheet is configured.
pub struct NoopSheetMirror;

#[async_trait]
impl SheetMirror for NoopSheetMirror {
    async fn append(&self, _student: &Student) -> Result<(), AppError> {
        Ok(())
    }

    async fn rewrite(&self, _students: &[Student]) -> Result<(), AppError> {
        Ok(())
    }
}

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer";

#[derive(Debug, Serialize)]
struct ServiceAccountClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Google Sheets v4 client authenticated as a service account.
pub struct GoogleSheetMirror {
    client: Client,
    sheet_id: String,
    sheet_name: String,
    service_account_email: String,
    key: EncodingKey,
    token_uri: String,
    api_base: String,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetMirror {
    /// Returns `None` when the sheet id or service account credentials are
    /// missing.
    pub fn from_config(config: &SheetsConfig) -> Result<Option<Self>, AppError> {
        let (Some(sheet_id), Some(email), Some(private_key)) = (
            config.sheet_id.clone(),
            config.service_account_email.clone(),
            config.private_key.as_deref(),
        ) else {
            return Ok(None);
        };

        let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(|e| AppError::internal_error(format!("Invalid service account key: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::internal_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Some(Self {
            client,
            sheet_id,
            sheet_name: config.sheet_name.clone(),
            service_account_email: email,
            key,
            token_uri: config.token_uri.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }))
    }

    async fn access_token(&self) -> Result<String, AppError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.token.clone());
            }
        }

        let now = Utc::now().timestamp();
        let claims = ServiceAccountClaims {
            iss: &self.service_account_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| AppError::internal_error(format!("Failed to sign assertion: {}", e)))?;

        let response: TokenResponse = self
            .client
            .post(&self.token_uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(format!(
                "grant_type={}&assertion={}",
                JWT_BEARER_GRANT, assertion
            ))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::internal_error(format!("Token request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::internal_error(format!("Invalid token response: {}", e)))?;

        // Refresh a minute early.
        let ttl = Duration::from_secs(response.expires_in.saturating_sub(60));
        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at: Instant::now() + ttl,
        });

        Ok(response.access_token)
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/{}/values/{}!{}{}",
            self.api_base, self.sheet_id, self.sheet_name, range, suffix
        )
    }

    async fn is_empty(&self, token: &str) -> Result<bool, AppError> {
        let existing: ValueRange = self
            .client
            .get(self.values_url("A1:A1", ""))
            .bearer_auth(token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::internal_error(format!("Sheet read failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::internal_error(format!("Invalid sheet response: {}", e)))?;

        Ok(existing.values.is_empty())
    }

    async fn write(&self, token: &str, values: Vec<Vec<String>>) -> Result<(), AppError> {
        self.client
            .put(self.values_url("A1", "?valueInputOption=RAW"))
            .bearer_auth(token)
            .json(&json!({ "values": values }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::internal_error(format!("Sheet update failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl SheetMirror for GoogleSheetMirror {
    #[instrument(skip(self, student), fields(student_id = %student.student_id))]
    async fn append(&self, student: &Student) -> Result<(), AppError> {
        let token = self.access_token().await?;

        if self.is_empty(&token).await? {
            return self
                .write(&token, vec![header_row(), student_row(student)])
                .await;
        }

        self.client
            .post(self.values_url(
                "A1",
                ":append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            ))
            .bearer_auth(&token)
            .json(&json!({ "values": [student_row(student)] }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::internal_error(format!("Sheet append failed: {}", e)))?;

        Ok(())
    }

    #[instrument(skip(self, students), fields(count = students.len()))]
    async fn rewrite(&self, students: &[Student]) -> Result<(), AppError> {
        let token = self.access_token().await?;

        // Clear first so a shorter list leaves no stale rows behind.
        self.client
            .post(format!(
                "{}/{}/values/{}:clear",
                self.api_base, self.sheet_id, self.sheet_name
            ))
            .bearer_auth(&token)
            .json(&json!({}))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::internal_error(format!("Sheet clear failed: {}", e)))?;

        self.write(&token, stream_separated_rows(students)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitdesk_models::StudentId;
    use admitdesk_models::students::{ClassMoving, Gender, NewStudent, Target};

    fn student(seq: i64, name: &str, stream: Stream, roll_no: Option<i32>) -> Student {
        let mut s = NewStudent {
            student_name: name.to_string(),
            gender: Gender::Female,
            class_moving: ClassMoving::TenthToEleventh,
            date_of_birth: chrono::NaiveDate::from_ymd_opt(2009, 4, 2),
            stream,
            target: Target::Neet,
            father_name: "F".to_string(),
            mother_name: "M".to_string(),
            email: None,
            permanent_address: "A".to_string(),
            present_address: "A".to_string(),
            parent_mobile: "9876543210".to_string(),
            student_mobile: None,
            whatsapp_mobile: None,
            previous_school: "S".to_string(),
            previous_result_percentage: 88.5,
            test_centre: "C".to_string(),
            scholarship_offered: true,
            scholarship_details: Some("Full".to_string()),
            passport_photo_url: "p".to_string(),
            identity_photo_url: "i".to_string(),
        }
        .into_student(StudentId::from_sequence(seq), Utc::now());
        s.roll_no = roll_no;
        s
    }

    #[test]
    fn test_student_row_matches_headers() {
        let row = student_row(&student(3, "Asha", Stream::Pcb, Some(2)));
        assert_eq!(row.len(), HEADERS.len());
        assert_eq!(row[1], "2");
        assert_eq!(row[2], "STU0003");
        assert_eq!(row[7], "2009-04-02");
        assert_eq!(row[8], "PCB");
        assert_eq!(row[18], "88.5");
        assert_eq!(row[19], "Yes");
        assert_eq!(row[4], "");
    }

    #[test]
    fn test_stream_separated_layout() {
        let students = vec![
            student(1, "B", Stream::Pcb, Some(2)),
            student(2, "A", Stream::Pcm, Some(2)),
            student(3, "C", Stream::Pcb, Some(1)),
            student(4, "D", Stream::Pcm, Some(1)),
        ];

        let rows = stream_separated_rows(&students);
        assert_eq!(rows.len(), 1 + 2 + SEPARATOR_ROWS + 2);
        assert_eq!(rows[0][0], "Submission Timestamp");

        let ids: Vec<&str> = rows.iter().map(|r| r[2].as_str()).collect();
        assert_eq!(
            ids,
            vec!["Student ID", "STU0004", "STU0002", "", "", "", "STU0003", "STU0001"]
        );
        assert!(rows[3].iter().all(|c| c.is_empty()));
        assert_eq!(rows[3].len(), HEADERS.len());
    }

    #[test]
    fn test_stream_separated_with_no_students() {
        let rows = stream_separated_rows(&[]);
        assert_eq!(rows.len(), 1 + SEPARATOR_ROWS);
    }

    #[test]
    fn test_disabled_config_gives_no_mirror() {
        let config = SheetsConfig {
            sheet_id: None,
            sheet_name: "Sheet1".to_string(),
            service_account_email: None,
            private_key: None,
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            api_base: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
        };
        assert!(GoogleSheetMirror::from_config(&config).unwrap().is_none());
    }
}
