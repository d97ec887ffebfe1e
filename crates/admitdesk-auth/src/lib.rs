//! # Admit Desk Auth
//!
//! Admin tokens for the Admit Desk API.
//!
//! - [`claims`]: JWT claims carried by admin tokens
//! - [`jwt`]: Token creation and verification
//!
//! # Example
//!
//! ```ignore
//! use admitdesk_auth::{create_access_token, verify_token};
//! use admitdesk_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(admin.id, &admin.username, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.username, admin.username);
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
