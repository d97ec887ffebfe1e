//! # Admit Desk Config
//!
//! Configuration types for the Admit Desk API, each loaded from environment
//! variables with development-friendly defaults:
//!
//! - [`admit_card`]: Institute branding printed on cards and emails
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`email`]: SMTP configuration for admit card delivery
//! - [`jwt`]: Admin token configuration
//! - [`otp`]: One-time password expiry and lockout
//! - [`rate_limit`]: API rate limiting configuration
//! - [`server`]: Listen addresses
//! - [`sheets`]: Google Sheets export
//! - [`sms`]: SMS gateway
//! - [`uploads`]: Registration document storage
//!
//! # Example
//!
//! ```ignore
//! use admitdesk_config::{JwtConfig, EmailConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let email_config = EmailConfig::from_env();
//! ```

pub mod admit_card;
pub mod cors;
pub mod email;
pub mod jwt;
pub mod otp;
pub mod rate_limit;
pub mod server;
pub mod sheets;
pub mod sms;
pub mod uploads;

mod env;

// Re-export commonly used types at crate root
pub use admit_card::AdmitCardConfig;
pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use otp::OtpConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
pub use sheets::SheetsConfig;
pub use sms::SmsConfig;
pub use uploads::UploadConfig;
