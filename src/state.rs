use std::path::PathBuf;
use std::sync::Arc;

use admitdesk_config::{
    AdmitCardConfig, CorsConfig, EmailConfig, JwtConfig, OtpConfig, RateLimitConfig,
    SheetsConfig, SmsConfig, UploadConfig,
};
use admitdesk_core::errors::AppError;
use admitdesk_core::file_storage::{FileStorage, LocalFileStorage};
use admitdesk_db::{PgPool, Repositories};
use tokio::sync::Mutex;

use crate::modules::otp::store::OtpStore;
use crate::utils::email::{LogMailer, Mailer, SmtpMailer};
use crate::utils::rate_limit::RateLimiters;
use crate::utils::sheets::{GoogleSheetMirror, NoopSheetMirror, SheetMirror};
use crate::utils::sms::{HttpSmsGateway, LogSmsGateway, SmsGateway};

/// Shared state handed to every handler.
///
/// Collaborators sit behind trait objects so tests can swap in in-memory
/// repositories and recording doubles.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub storage: Arc<dyn FileStorage>,
    pub mailer: Arc<dyn Mailer>,
    pub sms: Arc<dyn SmsGateway>,
    pub sheets: Arc<dyn SheetMirror>,
    pub otp_store: Arc<OtpStore>,
    pub rate_limiters: RateLimiters,
    /// Serializes roll number runs within this process.
    pub roll_number_guard: Arc<Mutex<()>>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub admit_card_config: AdmitCardConfig,
    pub upload_config: UploadConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cors_config", &self.cors_config)
            .field("admit_card_config", &self.admit_card_config)
            .field("upload_config", &self.upload_config)
            .field("rate_limiters", &self.rate_limiters)
            .finish_non_exhaustive()
    }
}

pub async fn init_app_state(pool: PgPool) -> Result<AppState, AppError> {
    let upload_config = UploadConfig::from_env();
    let storage = LocalFileStorage::with_max_size(
        PathBuf::from(&upload_config.dir),
        upload_config.public_base_url.clone(),
        upload_config.max_file_size,
    );

    let email_config = EmailConfig::from_env();
    let mailer: Arc<dyn Mailer> = if email_config.enabled {
        Arc::new(SmtpMailer::new(email_config))
    } else {
        tracing::warn!("SMTP_ENABLED is false, admit card emails will only be logged");
        Arc::new(LogMailer)
    };

    let sms_config = SmsConfig::from_env();
    let sms: Arc<dyn SmsGateway> = match sms_config.api_key.clone() {
        Some(key) => Arc::new(HttpSmsGateway::new(&sms_config, key)?),
        None => {
            tracing::warn!("SMS_API_KEY not set, OTPs will only be logged");
            Arc::new(LogSmsGateway)
        }
    };

    let sheets: Arc<dyn SheetMirror> = match GoogleSheetMirror::from_config(&SheetsConfig::from_env())? {
        Some(mirror) => Arc::new(mirror),
        None => {
            tracing::info!("Google Sheets export not configured");
            Arc::new(NoopSheetMirror)
        }
    };

    Ok(AppState {
        repos: Repositories::postgres(pool),
        storage: Arc::new(storage),
        mailer,
        sms,
        sheets,
        otp_store: Arc::new(OtpStore::new(OtpConfig::from_env())),
        rate_limiters: RateLimiters::from_config(&RateLimitConfig::from_env()),
        roll_number_guard: Arc::new(Mutex::new(())),
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        admit_card_config: AdmitCardConfig::from_env(),
        upload_config,
    })
}
