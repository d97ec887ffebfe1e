//! Student domain models and DTOs.
//!
//! This module contains the registrant entity, the registration form DTO,
//! and the filters used by the admin list.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use admitdesk_core::dates::parse_iso_date;

use crate::ids::StudentId;

text_enum! {
    /// Subject stream. Roll numbers are sequenced per stream.
    Stream as "stream" {
        Pcm => "PCM",
        Pcb => "PCB",
    }
}

text_enum! {
    Target as "target" {
        Jee => "JEE",
        Neet => "NEET",
        CbseBoard => "CBSE Board",
    }
}

text_enum! {
    Gender as "gender" {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
}

text_enum! {
    ClassMoving as "classMoving" {
        TenthToEleventh => "10th to 11th",
    }
}

/// A registered student.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: StudentId,
    pub student_name: String,
    pub gender: Gender,
    pub class_moving: ClassMoving,
    pub date_of_birth: Option<NaiveDate>,
    pub stream: Stream,
    pub target: Target,
    pub father_name: String,
    pub mother_name: String,
    pub email: Option<String>,
    pub permanent_address: String,
    pub present_address: String,
    pub parent_mobile: String,
    pub student_mobile: Option<String>,
    pub whatsapp_mobile: Option<String>,
    pub previous_school: String,
    pub previous_result_percentage: f64,
    pub test_centre: String,
    pub scholarship_offered: bool,
    pub scholarship_details: Option<String>,
    pub passport_photo_url: String,
    pub identity_photo_url: String,
    pub roll_no: Option<i32>,
    pub admit_card_generated: bool,
    pub admit_card_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn status(&self) -> AdmitCardStatus {
        if self.admit_card_sent {
            AdmitCardStatus::Sent
        } else if self.admit_card_generated {
            AdmitCardStatus::Generated
        } else {
            AdmitCardStatus::Pending
        }
    }

    /// Email address suitable for delivery, if any.
    pub fn deliverable_email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

/// Everything needed to insert a student except the allocated id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub student_name: String,
    pub gender: Gender,
    pub class_moving: ClassMoving,
    pub date_of_birth: Option<NaiveDate>,
    pub stream: Stream,
    pub target: Target,
    pub father_name: String,
    pub mother_name: String,
    pub email: Option<String>,
    pub permanent_address: String,
    pub present_address: String,
    pub parent_mobile: String,
    pub student_mobile: Option<String>,
    pub whatsapp_mobile: Option<String>,
    pub previous_school: String,
    pub previous_result_percentage: f64,
    pub test_centre: String,
    pub scholarship_offered: bool,
    pub scholarship_details: Option<String>,
    pub passport_photo_url: String,
    pub identity_photo_url: String,
}

impl NewStudent {
    /// Materializes the row the store would write for `student_id`.
    pub fn into_student(self, student_id: StudentId, now: DateTime<Utc>) -> Student {
        Student {
            student_id,
            student_name: self.student_name,
            gender: self.gender,
            class_moving: self.class_moving,
            date_of_birth: self.date_of_birth,
            stream: self.stream,
            target: self.target,
            father_name: self.father_name,
            mother_name: self.mother_name,
            email: self.email,
            permanent_address: self.permanent_address,
            present_address: self.present_address,
            parent_mobile: self.parent_mobile,
            student_mobile: self.student_mobile,
            whatsapp_mobile: self.whatsapp_mobile,
            previous_school: self.previous_school,
            previous_result_percentage: self.previous_result_percentage,
            test_centre: self.test_centre,
            scholarship_offered: self.scholarship_offered,
            scholarship_details: self.scholarship_details,
            passport_photo_url: self.passport_photo_url,
            identity_photo_url: self.identity_photo_url,
            roll_no: None,
            admit_card_generated: false,
            admit_card_sent: false,
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_mobile(value: &str) -> Result<(), ValidationError> {
    if value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("mobile"))
    }
}

/// NaN fails every comparison, so a plain range check would let it through.
fn validate_percentage(value: f64) -> Result<(), ValidationError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("percentage"))
    }
}

/// True when `value` is a 10-digit mobile number.
pub fn is_valid_mobile(value: &str) -> bool {
    validate_mobile(value).is_ok()
}

fn validate_scholarship(dto: &RegisterStudentDto) -> Result<(), ValidationError> {
    let has_details = dto
        .scholarship_details
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());

    if dto.scholarship_offered && !has_details {
        let mut err = ValidationError::new("scholarship_details");
        err.message = Some("scholarshipDetails is required when a scholarship is offered".into());
        return Err(err);
    }
    Ok(())
}

/// Text fields of the registration form.
///
/// The two document uploads travel alongside in the same multipart body and
/// are handled by the registration controller.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_scholarship"))]
pub struct RegisterStudentDto {
    #[validate(length(min = 1, max = 120, message = "studentName is required"))]
    pub student_name: String,
    pub gender: Gender,
    pub class_moving: ClassMoving,
    pub date_of_birth: Option<NaiveDate>,
    pub stream: Stream,
    pub target: Target,
    #[validate(length(min = 1, max = 120, message = "fatherName is required"))]
    pub father_name: String,
    #[validate(length(min = 1, max = 120, message = "motherName is required"))]
    pub mother_name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "permanentAddress is required"))]
    pub permanent_address: String,
    #[validate(length(min = 1, message = "presentAddress is required"))]
    pub present_address: String,
    #[validate(custom(
        function = "validate_mobile",
        message = "parentMobile must be a 10-digit number"
    ))]
    pub parent_mobile: String,
    #[validate(custom(
        function = "validate_mobile",
        message = "studentMobile must be a 10-digit number"
    ))]
    pub student_mobile: Option<String>,
    #[validate(custom(
        function = "validate_mobile",
        message = "whatsappMobile must be a 10-digit number"
    ))]
    pub whatsapp_mobile: Option<String>,
    #[validate(length(min = 1, message = "previousSchool is required"))]
    pub previous_school: String,
    #[validate(custom(
        function = "validate_percentage",
        message = "previousResultPercentage must be between 0 and 100"
    ))]
    pub previous_result_percentage: f64,
    pub test_centre: Option<String>,
    #[serde(default)]
    pub scholarship_offered: bool,
    pub scholarship_details: Option<String>,
}

/// Error raised while reading raw form fields into a [`RegisterStudentDto`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FormFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FormFieldError {}

impl RegisterStudentDto {
    /// Builds the DTO from the text parts of a multipart form.
    ///
    /// Missing strings become empty so that [`Validate`] reports them with a
    /// field message. Enum, number, date and flag fields fail here instead.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, FormFieldError> {
        let text = |name: &str| -> String {
            fields
                .get(name)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        let optional = |name: &str| -> Option<String> {
            fields
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        fn parse<T>(field: &'static str, raw: Option<String>) -> Result<T, FormFieldError>
        where
            T: std::str::FromStr,
            T::Err: std::fmt::Display,
        {
            let raw = raw.ok_or_else(|| FormFieldError {
                field,
                message: format!("{field} is required"),
            })?;
            raw.parse().map_err(|e: T::Err| FormFieldError {
                field,
                message: e.to_string(),
            })
        }

        let date_of_birth = optional("dateOfBirth")
            .map(|raw| {
                parse_iso_date(&raw).ok_or_else(|| FormFieldError {
                    field: "dateOfBirth",
                    message: "dateOfBirth must be a YYYY-MM-DD date".to_string(),
                })
            })
            .transpose()?;

        let scholarship_offered = optional("scholarshipOffered")
            .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "true" | "yes" | "on" | "1"))
            .unwrap_or(false);

        let previous_result_percentage = parse::<f64>(
            "previousResultPercentage",
            optional("previousResultPercentage"),
        )?;

        Ok(Self {
            student_name: text("studentName"),
            gender: parse("gender", optional("gender"))?,
            class_moving: parse("classMoving", optional("classMoving"))?,
            date_of_birth,
            stream: parse("stream", optional("stream"))?,
            target: parse("target", optional("target"))?,
            father_name: text("fatherName"),
            mother_name: text("motherName"),
            email: text("email"),
            permanent_address: text("permanentAddress"),
            present_address: text("presentAddress"),
            parent_mobile: text("parentMobile"),
            student_mobile: optional("studentMobile"),
            whatsapp_mobile: optional("whatsappMobile"),
            previous_school: text("previousSchool"),
            previous_result_percentage,
            test_centre: optional("testCentre"),
            scholarship_offered,
            scholarship_details: optional("scholarshipDetails"),
        })
    }

    /// Combines the validated form with stored document URLs.
    pub fn into_new_student(
        self,
        default_test_centre: &str,
        passport_photo_url: String,
        identity_photo_url: String,
    ) -> NewStudent {
        NewStudent {
            student_name: self.student_name,
            gender: self.gender,
            class_moving: self.class_moving,
            date_of_birth: self.date_of_birth,
            stream: self.stream,
            target: self.target,
            father_name: self.father_name,
            mother_name: self.mother_name,
            email: Some(self.email),
            permanent_address: self.permanent_address,
            present_address: self.present_address,
            parent_mobile: self.parent_mobile,
            student_mobile: self.student_mobile,
            whatsapp_mobile: self.whatsapp_mobile,
            previous_school: self.previous_school,
            previous_result_percentage: self.previous_result_percentage,
            test_centre: self
                .test_centre
                .unwrap_or_else(|| default_test_centre.to_string()),
            scholarship_offered: self.scholarship_offered,
            scholarship_details: if self.scholarship_offered {
                self.scholarship_details
            } else {
                None
            },
            passport_photo_url,
            identity_photo_url,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentResponse {
    pub message: String,
    pub student_id: StudentId,
    pub student: Student,
}

/// Admit card progress shown in the admin list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum AdmitCardStatus {
    /// Generated but not yet sent.
    Generated,
    Sent,
    /// Neither generated nor sent.
    Pending,
}

/// Query parameters for the admin student list.
#[derive(Deserialize, Debug, Clone, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentFilter {
    /// Case-insensitive substring of the name or student id.
    pub search: Option<String>,
    pub stream: Option<Stream>,
    pub target: Option<Target>,
    pub status: Option<AdmitCardStatus>,
}

impl StudentFilter {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, student: &Student) -> bool {
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            let hit = student.student_name.to_lowercase().contains(&term)
                || student.student_id.as_str().to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if self.stream.is_some_and(|s| s != student.stream) {
            return false;
        }
        if self.target.is_some_and(|t| t != student.target) {
            return false;
        }
        if self.status.is_some_and(|s| s != student.status()) {
            return false;
        }

        true
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct StudentListResponse {
    pub success: bool,
    pub data: Vec<Student>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> HashMap<String, String> {
        [
            ("studentName", "Asha Kumari"),
            ("gender", "Female"),
            ("classMoving", "10th to 11th"),
            ("dateOfBirth", "2009-05-14"),
            ("stream", "PCB"),
            ("target", "NEET"),
            ("fatherName", "Ramesh Kumar"),
            ("motherName", "Sunita Devi"),
            ("email", "asha@example.com"),
            ("permanentAddress", "Gaya"),
            ("presentAddress", "Gaya"),
            ("parentMobile", "9876543210"),
            ("previousSchool", "DAV Public School"),
            ("previousResultPercentage", "91.4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn student(id: i64, name: &str, stream: Stream) -> Student {
        let dto = RegisterStudentDto::from_form(&form()).unwrap();
        let mut new = dto.into_new_student("Centre", "p".into(), "i".into());
        new.student_name = name.to_string();
        new.stream = stream;
        new.into_student(StudentId::from_sequence(id), Utc::now())
    }

    #[test]
    fn test_enum_labels_round_trip() {
        assert_eq!("CBSE Board".parse::<Target>().unwrap(), Target::CbseBoard);
        assert_eq!(ClassMoving::TenthToEleventh.as_str(), "10th to 11th");
        assert_eq!(serde_json::to_string(&Stream::Pcm).unwrap(), "\"PCM\"");
        assert!("Biology".parse::<Stream>().is_err());
    }

    #[test]
    fn test_from_form_parses_valid_form() {
        let dto = RegisterStudentDto::from_form(&form()).unwrap();
        assert_eq!(dto.stream, Stream::Pcb);
        assert_eq!(dto.previous_result_percentage, 91.4);
        assert_eq!(dto.date_of_birth, NaiveDate::from_ymd_opt(2009, 5, 14));
        assert!(!dto.scholarship_offered);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_from_form_rejects_unknown_stream() {
        let mut fields = form();
        fields.insert("stream".into(), "Arts".into());
        let err = RegisterStudentDto::from_form(&fields).unwrap_err();
        assert_eq!(err.field, "stream");
    }

    #[test]
    fn test_validation_rejects_bad_parent_mobile() {
        let mut fields = form();
        fields.insert("parentMobile".into(), "12345".into());
        let dto = RegisterStudentDto::from_form(&fields).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("parent_mobile"));
    }

    #[test]
    fn test_validation_rejects_percentage_out_of_range() {
        let mut fields = form();
        fields.insert("previousResultPercentage".into(), "104".into());
        let dto = RegisterStudentDto::from_form(&fields).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_finite_percentage() {
        for raw in ["NaN", "inf", "-inf"] {
            let mut fields = form();
            fields.insert("previousResultPercentage".into(), raw.into());
            let dto = RegisterStudentDto::from_form(&fields).unwrap();
            let errors = dto.validate().unwrap_err();
            assert!(
                errors.field_errors().contains_key("previous_result_percentage"),
                "{raw} accepted"
            );
        }
    }

    #[test]
    fn test_from_form_rejects_trailing_text_in_date_of_birth() {
        let mut fields = form();
        fields.insert("dateOfBirth".into(), "2009-05-14garbage".into());
        let err = RegisterStudentDto::from_form(&fields).unwrap_err();
        assert_eq!(err.field, "dateOfBirth");

        fields.insert("dateOfBirth".into(), "2009-05-14T00:00:00Z".into());
        let dto = RegisterStudentDto::from_form(&fields).unwrap();
        assert_eq!(dto.date_of_birth, NaiveDate::from_ymd_opt(2009, 5, 14));
    }

    #[test]
    fn test_scholarship_requires_details() {
        let mut fields = form();
        fields.insert("scholarshipOffered".into(), "true".into());
        let dto = RegisterStudentDto::from_form(&fields).unwrap();
        assert!(dto.validate().is_err());

        fields.insert("scholarshipDetails".into(), "50% tuition".into());
        let dto = RegisterStudentDto::from_form(&fields).unwrap();
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_into_new_student_defaults_test_centre() {
        let dto = RegisterStudentDto::from_form(&form()).unwrap();
        let new = dto.into_new_student("Main Hall", "p".into(), "i".into());
        assert_eq!(new.test_centre, "Main Hall");
        assert_eq!(new.email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn test_status_follows_flags() {
        let mut s = student(1, "A", Stream::Pcm);
        assert_eq!(s.status(), AdmitCardStatus::Pending);
        s.admit_card_generated = true;
        assert_eq!(s.status(), AdmitCardStatus::Generated);
        s.admit_card_sent = true;
        assert_eq!(s.status(), AdmitCardStatus::Sent);
    }

    #[test]
    fn test_filter_matches() {
        let s = student(12, "Ravi Shankar", Stream::Pcm);

        let by_name = StudentFilter {
            search: Some("ravi".into()),
            ..Default::default()
        };
        assert!(by_name.matches(&s));

        let by_id = StudentFilter {
            search: Some("stu0012".into()),
            ..Default::default()
        };
        assert!(by_id.matches(&s));

        let wrong_stream = StudentFilter {
            stream: Some(Stream::Pcb),
            ..Default::default()
        };
        assert!(!wrong_stream.matches(&s));

        let sent = StudentFilter {
            status: Some(AdmitCardStatus::Sent),
            ..Default::default()
        };
        assert!(!sent.matches(&s));
    }
}
