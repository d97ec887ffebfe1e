//! Outbound collaborators and shared helpers.
//!
//! - [`email`]: Admit card delivery over SMTP
//! - [`sms`]: OTP delivery through an SMS gateway
//! - [`sheets`]: Spreadsheet export of registrations
//! - [`rate_limit`]: Keyed rate limiters for unauthenticated endpoints

pub mod email;
pub mod rate_limit;
pub mod sheets;
pub mod sms;
