//! Request middleware.
//!
//! - [`auth`]: Admin token check and the [`auth::AuthAdmin`] extractor
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. [`auth::require_admin`] verifies the JWT and stores the claims
//! 3. Handlers that need the caller take [`auth::AuthAdmin`]

pub mod auth;
