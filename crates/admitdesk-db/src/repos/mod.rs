//! Repository traits and their implementations.
//!
//! - [`postgres`]: production implementations over a [`PgPool`]
//! - [`memory`]: process-local implementations used by tests

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use admitdesk_models::admins::Admin;
use admitdesk_models::dashboard::{DashboardStats, SummaryStats};
use admitdesk_models::roll_numbers::RollAssignment;
use admitdesk_models::settings::{Settings, UpdateSettingsDto};
use admitdesk_models::students::{NewStudent, Student, StudentFilter};
use admitdesk_models::StudentId;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DbResult;

/// Computes roll numbers from a snapshot of every student.
///
/// Called by [`StudentRepository::assign_roll_numbers`] while the store holds
/// the assignment lock, so the snapshot cannot change underneath it.
pub type RollPlanner<'a> = &'a (dyn Fn(&[Student]) -> Vec<RollAssignment> + Send + Sync);

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Allocates the next student id and inserts the row atomically.
    ///
    /// Either both the counter increment and the insert persist, or neither.
    async fn create(&self, new: NewStudent) -> DbResult<Student>;

    async fn find_by_id(&self, id: &StudentId) -> DbResult<Option<Student>>;

    /// Students whose id is in `ids`. Unknown ids are ignored; order is
    /// unspecified.
    async fn find_many(&self, ids: &[StudentId]) -> DbResult<Vec<Student>>;

    /// Students matching `filter`, newest first.
    async fn list(&self, filter: &StudentFilter) -> DbResult<Vec<Student>>;

    /// Re-derives every roll number under an exclusive lock.
    ///
    /// Existing roll numbers are cleared before the planner's assignments
    /// are written, all in one transaction.
    async fn assign_roll_numbers(&self, planner: RollPlanner<'_>)
    -> DbResult<Vec<RollAssignment>>;

    async fn mark_admit_card_generated(&self, id: &StudentId) -> DbResult<()>;

    /// Marks the card sent. Also sets the generated flag, since a sent card
    /// has necessarily been generated.
    async fn mark_admit_card_sent(&self, id: &StudentId) -> DbResult<()>;

    /// Sets the id counter back to zero. The next registration gets `STU0001`.
    async fn reset_counter(&self) -> DbResult<()>;

    /// Deletes every student and resets the counter in one transaction.
    async fn delete_all(&self) -> DbResult<u64>;

    async fn summary(&self) -> DbResult<SummaryStats>;

    async fn distributions(&self) -> DbResult<DashboardStats>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Returns the settings row, creating it with defaults if absent.
    async fn get_or_create(&self) -> DbResult<Settings>;

    /// Applies a partial update and returns the stored result.
    async fn update(&self, update: UpdateSettingsDto) -> DbResult<Settings>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<Admin>>;

    /// Fails with [`DbError::Conflict`](crate::DbError::Conflict) when the
    /// username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> DbResult<Admin>;
}

/// All repositories behind trait objects, as stored in application state.
#[derive(Clone)]
pub struct Repositories {
    pub students: Arc<dyn StudentRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub admins: Arc<dyn AdminRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            students: Arc::new(postgres::PgStudentRepository::new(pool.clone())),
            settings: Arc::new(postgres::PgSettingsRepository::new(pool.clone())),
            admins: Arc::new(postgres::PgAdminRepository::new(pool)),
        }
    }
}

/// Label used for the scholarship distribution.
pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}
