use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use admitdesk_models::admins::{LoginRequest, LoginResponse};
use admitdesk_models::admit_cards::{
    BulkSelectionRequest, GenerateBatchOutcome, GenerateBatchResponse, SendBatchOutcome,
    SendBatchResponse, SkippedStudent,
};
use admitdesk_models::dashboard::{CountBucket, DashboardStats, SummaryStats};
use admitdesk_models::otp::{OtpResponse, SendOtpRequest, VerifyOtpRequest};
use admitdesk_models::roll_numbers::{
    GenerateRollNumbersRequest, GenerateRollNumbersResponse, RollNumberOrder,
};
use admitdesk_models::settings::{Settings, SettingsResponse, UpdateSettingsDto};
use admitdesk_models::students::{
    AdmitCardStatus, ClassMoving, Gender, RegisterStudentDto, RegisterStudentResponse, Stream,
    Student, StudentListResponse, Target,
};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::maintenance::model::{ClearDatabaseResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_admin,
        crate::modules::students::controller::register_student,
        crate::modules::students::controller::get_students,
        crate::modules::settings::controller::get_exam_settings,
        crate::modules::settings::controller::update_exam_settings,
        crate::modules::roll_numbers::controller::generate_roll_numbers,
        crate::modules::admit_cards::controller::bulk_generate_admit_cards,
        crate::modules::admit_cards::controller::bulk_send_admit_cards,
        crate::modules::admit_cards::controller::download_admit_card,
        crate::modules::dashboard::controller::get_summary_stats,
        crate::modules::dashboard::controller::get_dashboard_stats,
        crate::modules::maintenance::controller::reset_id_counter,
        crate::modules::maintenance::controller::clear_database,
        crate::modules::otp::controller::send_otp,
        crate::modules::otp::controller::verify_otp,
    ),
    components(
        schemas(
            ErrorResponse,
            LoginRequest,
            LoginResponse,
            Student,
            Stream,
            Target,
            Gender,
            ClassMoving,
            AdmitCardStatus,
            RegisterStudentDto,
            RegisterStudentResponse,
            StudentListResponse,
            Settings,
            UpdateSettingsDto,
            SettingsResponse,
            RollNumberOrder,
            GenerateRollNumbersRequest,
            GenerateRollNumbersResponse,
            BulkSelectionRequest,
            SkippedStudent,
            GenerateBatchOutcome,
            GenerateBatchResponse,
            SendBatchOutcome,
            SendBatchResponse,
            SummaryStats,
            CountBucket,
            DashboardStats,
            MessageResponse,
            ClearDatabaseResponse,
            SendOtpRequest,
            VerifyOtpRequest,
            OtpResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Administrator login"),
        (name = "Students", description = "Registration and the admin student list"),
        (name = "Settings", description = "Exam date, venue and registration window"),
        (name = "Roll Numbers", description = "Per-stream roll number assignment"),
        (name = "Admit Cards", description = "PDF admit cards and bulk email delivery"),
        (name = "Dashboard", description = "Registration statistics"),
        (name = "Maintenance", description = "Counter reset and bulk deletion"),
        (name = "OTP", description = "Mobile number verification")
    ),
    info(
        title = "Admit Desk API",
        version = "0.1.0",
        description = "Student registration and admit card management for an entrance exam.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
