#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use admitdesk::router::init_router;
use admitdesk::state::AppState;
use admitdesk::utils::email::{Mailer, OutgoingEmail};
use admitdesk::utils::rate_limit::RateLimiters;
use admitdesk::utils::sheets::SheetMirror;
use admitdesk::utils::sms::SmsGateway;
use admitdesk::modules::otp::store::OtpStore;
use admitdesk_auth::create_access_token;
use admitdesk_config::{
    AdmitCardConfig, CorsConfig, JwtConfig, OtpConfig, RateLimitConfig, UploadConfig,
};
use admitdesk_core::errors::AppError;
use admitdesk_core::file_storage::LocalFileStorage;
use admitdesk_core::password::hash_password;
use admitdesk_db::repos::memory::{
    InMemoryAdminRepository, InMemorySettingsRepository, InMemoryStudentRepository,
};
use admitdesk_db::{AdminRepository, Repositories, StudentRepository};
use admitdesk_models::StudentId;
use admitdesk_models::students::{ClassMoving, Gender, NewStudent, Stream, Student, Target};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password123";

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    /// Addresses the "provider" refuses.
    pub reject: Mutex<Vec<String>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        if self.reject.lock().unwrap().contains(&email.to) {
            return Err(AppError::internal_error("Recipient rejected".to_string()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSms {
    pub fn last_otp(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, otp)| otp.clone())
    }
}

#[async_trait]
impl SmsGateway for RecordingSms {
    async fn send_otp(&self, mobile: &str, otp: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((mobile.to_string(), otp.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSheets {
    pub appended: Mutex<Vec<StudentId>>,
    /// Row count of every rewrite.
    pub rewrites: Mutex<Vec<usize>>,
}

#[async_trait]
impl SheetMirror for RecordingSheets {
    async fn append(&self, student: &Student) -> Result<(), AppError> {
        self.appended
            .lock()
            .unwrap()
            .push(student.student_id.clone());
        Ok(())
    }

    async fn rewrite(&self, students: &[Student]) -> Result<(), AppError> {
        self.rewrites.lock().unwrap().push(students.len());
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub students: Arc<InMemoryStudentRepository>,
    pub mailer: Arc<RecordingMailer>,
    pub sms: Arc<RecordingSms>,
    pub sheets: Arc<RecordingSheets>,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub async fn new() -> Self {
        let upload_dir = std::env::temp_dir().join(format!("admitdesk-test-{}", Uuid::new_v4()));
        let upload_config = UploadConfig {
            dir: upload_dir.to_string_lossy().into_owned(),
            public_base_url: "http://localhost:8000/uploads".to_string(),
            max_file_size: 1024 * 1024,
        };

        let students = Arc::new(InMemoryStudentRepository::new());
        let admins = Arc::new(InMemoryAdminRepository::new());
        admins
            .create(ADMIN_USERNAME, &hash_password(ADMIN_PASSWORD).unwrap())
            .await
            .unwrap();

        let mailer = Arc::new(RecordingMailer::default());
        let sms = Arc::new(RecordingSms::default());
        let sheets = Arc::new(RecordingSheets::default());

        let state = AppState {
            repos: Repositories {
                students: students.clone(),
                settings: Arc::new(InMemorySettingsRepository::new()),
                admins,
            },
            storage: Arc::new(LocalFileStorage::with_max_size(
                upload_dir.clone(),
                upload_config.public_base_url.clone(),
                upload_config.max_file_size,
            )),
            mailer: mailer.clone(),
            sms: sms.clone(),
            sheets: sheets.clone(),
            otp_store: Arc::new(OtpStore::new(OtpConfig::default())),
            rate_limiters: RateLimiters::from_config(&RateLimitConfig::default()),
            roll_number_guard: Arc::new(tokio::sync::Mutex::new(())),
            jwt_config: jwt_config(),
            cors_config: CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
            admit_card_config: AdmitCardConfig::default(),
            upload_config,
        };

        Self {
            state,
            students,
            mailer,
            sms,
            sheets,
            upload_dir,
        }
    }

    pub fn router(&self) -> Router {
        init_router(self.state.clone())
    }

    pub fn token(&self) -> String {
        create_access_token(Uuid::new_v4(), ADMIN_USERNAME, &self.state.jwt_config).unwrap()
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.router().oneshot(request).await.unwrap()
    }

    /// Inserts a student through the allocator, then applies `edit`.
    pub async fn seed_student(
        &self,
        name: &str,
        stream: Stream,
        edit: impl FnOnce(&mut Student),
    ) -> Student {
        let mut student = self.students.create(new_student(name, stream)).await.unwrap();
        edit(&mut student);
        self.students.put(student.clone()).await;
        student
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

pub fn new_student(name: &str, stream: Stream) -> NewStudent {
    NewStudent {
        student_name: name.to_string(),
        gender: Gender::Female,
        class_moving: ClassMoving::TenthToEleventh,
        date_of_birth: None,
        stream,
        target: if stream == Stream::Pcm { Target::Jee } else { Target::Neet },
        father_name: "Ramesh Kumar".to_string(),
        mother_name: "Sunita Devi".to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        permanent_address: "Manpur, Gaya".to_string(),
        present_address: "Manpur, Gaya".to_string(),
        parent_mobile: "9876543210".to_string(),
        student_mobile: None,
        whatsapp_mobile: None,
        previous_school: "DAV Public School".to_string(),
        previous_result_percentage: 85.0,
        test_centre: "British School Gurukul".to_string(),
        scholarship_offered: false,
        scholarship_details: None,
        passport_photo_url: "http://localhost:8000/uploads/passport/p.jpg".to_string(),
        identity_photo_url: "http://localhost:8000/uploads/identity/i.jpg".to_string(),
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub const BOUNDARY: &str = "admitdeskboundary";

/// A `multipart/form-data` body with text fields and `(name, filename, type, bytes)` files.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
