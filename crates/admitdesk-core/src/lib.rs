//! # Admit Desk Core
//!
//! Core types, errors, and utilities for the Admit Desk API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`password`]: Password hashing and verification
//! - [`file_storage`]: Storage backends for uploaded registration documents
//! - [`dates`]: Exam date formatting shared by the PDF renderer and emails
//!
//! # Example
//!
//! ```ignore
//! use admitdesk_core::errors::AppError;
//! use admitdesk_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Student not found"));
//! let hash = hash_password("secure_password")?;
//! ```

pub mod dates;
pub mod errors;
pub mod file_storage;
pub mod password;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use password::{hash_password, verify_password};
