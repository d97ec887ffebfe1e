//! # Admit Desk CLI
//!
//! Seeding utilities for Admit Desk testing and development.
//!
//! ## Usage
//!
//! ```ignore
//! use admitdesk_cli::seeder::seed_students;
//!
//! let repos = admitdesk_db::Repositories::postgres(pool);
//! let ids = seed_students(repos.students.as_ref(), 200).await?;
//! ```

pub mod seeder;
