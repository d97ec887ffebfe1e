//! # Admit Desk Models
//!
//! Domain models and DTOs for the Admit Desk API.
//!
//! - [`admins`]: Administrator accounts and login
//! - [`admit_cards`]: Bulk generate/send requests and tallies
//! - [`dashboard`]: Summary and distribution statistics
//! - [`ids`]: The `STU0001`-style student identifier
//! - [`otp`]: Mobile OTP requests
//! - [`roll_numbers`]: Roll number ordering and assignments
//! - [`settings`]: Exam settings singleton
//! - [`students`]: Student entity, registration DTO and list filters
//!
//! # Example
//!
//! ```ignore
//! use admitdesk_models::ids::StudentId;
//! use admitdesk_models::students::Stream;
//!
//! let id = StudentId::from_sequence(7);
//! assert_eq!(id.as_str(), "STU0007");
//! ```

#[macro_use]
mod text_enum;

pub mod admins;
pub mod admit_cards;
pub mod dashboard;
pub mod ids;
pub mod otp;
pub mod roll_numbers;
pub mod settings;
pub mod students;

pub use ids::StudentId;
pub use text_enum::UnknownVariant;
pub use settings::{ExamDetails, Settings};
pub use students::{ClassMoving, Gender, NewStudent, Stream, Student, Target};
