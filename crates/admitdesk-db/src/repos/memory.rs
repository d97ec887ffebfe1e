//! In-memory repositories.
//!
//! Each repository keeps its rows behind one `RwLock`, so every trait method
//! is atomic with respect to the others.

use std::collections::{HashMap, HashSet};

use admitdesk_models::admins::Admin;
use admitdesk_models::dashboard::{CountBucket, DashboardStats, SummaryStats};
use admitdesk_models::roll_numbers::RollAssignment;
use admitdesk_models::settings::{Settings, UpdateSettingsDto};
use admitdesk_models::students::{NewStudent, Stream, Student, StudentFilter};
use admitdesk_models::StudentId;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{yes_no, AdminRepository, RollPlanner, SettingsRepository, StudentRepository};
use crate::error::{DbError, DbResult};

#[derive(Debug, Default)]
struct StudentTable {
    seq: i64,
    rows: Vec<Student>,
}

#[derive(Debug, Default)]
pub struct InMemoryStudentRepository {
    table: RwLock<StudentTable>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter value.
    pub async fn sequence(&self) -> i64 {
        self.table.read().await.seq
    }

    /// Replaces a stored row wholesale. Test fixtures use this to set up
    /// states such as "generated but missing email".
    pub async fn put(&self, student: Student) {
        let mut table = self.table.write().await;
        match table
            .rows
            .iter_mut()
            .find(|s| s.student_id == student.student_id)
        {
            Some(row) => *row = student,
            None => table.rows.push(student),
        }
    }

    fn newest_first(a: &Student, b: &Student) -> std::cmp::Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.student_id.sequence().cmp(&a.student_id.sequence()))
    }
}

fn buckets<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<CountBucket> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut buckets: Vec<CountBucket> = counts
        .into_iter()
        .map(|(name, count)| CountBucket {
            name: name.to_string(),
            count,
        })
        .collect();
    CountBucket::sort(&mut buckets);
    buckets
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn create(&self, new: NewStudent) -> DbResult<Student> {
        let mut table = self.table.write().await;
        let student_id = StudentId::from_sequence(table.seq + 1);
        if table.rows.iter().any(|s| s.student_id == student_id) {
            return Err(DbError::Conflict(format!("student {student_id}")));
        }

        table.seq += 1;
        let student = new.into_student(student_id, Utc::now());
        table.rows.push(student.clone());
        Ok(student)
    }

    async fn find_by_id(&self, id: &StudentId) -> DbResult<Option<Student>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|s| &s.student_id == id).cloned())
    }

    async fn find_many(&self, ids: &[StudentId]) -> DbResult<Vec<Student>> {
        let wanted: HashSet<&StudentId> = ids.iter().collect();
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|s| wanted.contains(&s.student_id))
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &StudentFilter) -> DbResult<Vec<Student>> {
        let table = self.table.read().await;
        let mut students: Vec<Student> = table
            .rows
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        students.sort_by(Self::newest_first);
        Ok(students)
    }

    async fn assign_roll_numbers(
        &self,
        planner: RollPlanner<'_>,
    ) -> DbResult<Vec<RollAssignment>> {
        let mut table = self.table.write().await;
        let assignments = planner(&table.rows);

        let by_id: HashMap<&StudentId, i32> = assignments
            .iter()
            .map(|a| (&a.student_id, a.roll_no))
            .collect();
        let now = Utc::now();
        for row in table.rows.iter_mut() {
            row.roll_no = by_id.get(&row.student_id).copied();
            row.updated_at = now;
        }

        Ok(assignments)
    }

    async fn mark_admit_card_generated(&self, id: &StudentId) -> DbResult<()> {
        let mut table = self.table.write().await;
        if let Some(row) = table.rows.iter_mut().find(|s| &s.student_id == id) {
            row.admit_card_generated = true;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_admit_card_sent(&self, id: &StudentId) -> DbResult<()> {
        let mut table = self.table.write().await;
        if let Some(row) = table.rows.iter_mut().find(|s| &s.student_id == id) {
            row.admit_card_generated = true;
            row.admit_card_sent = true;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn reset_counter(&self) -> DbResult<()> {
        self.table.write().await.seq = 0;
        Ok(())
    }

    async fn delete_all(&self) -> DbResult<u64> {
        let mut table = self.table.write().await;
        let deleted = table.rows.len() as u64;
        table.rows.clear();
        table.seq = 0;
        Ok(deleted)
    }

    async fn summary(&self) -> DbResult<SummaryStats> {
        let table = self.table.read().await;
        let count = |pred: &dyn Fn(&Student) -> bool| {
            table.rows.iter().filter(|s| pred(s)).count() as i64
        };

        Ok(SummaryStats {
            total_students: table.rows.len() as i64,
            pcm_count: count(&|s| s.stream == Stream::Pcm),
            pcb_count: count(&|s| s.stream == Stream::Pcb),
            admit_card_generated: count(&|s| s.admit_card_generated),
            admit_card_sent: count(&|s| s.admit_card_sent),
            roll_numbers_assigned: count(&|s| s.roll_no.is_some()),
        })
    }

    async fn distributions(&self) -> DbResult<DashboardStats> {
        let table = self.table.read().await;
        let rows = &table.rows;

        Ok(DashboardStats {
            gender: buckets(rows.iter().map(|s| s.gender.as_str())),
            stream: buckets(rows.iter().map(|s| s.stream.as_str())),
            target: buckets(rows.iter().map(|s| s.target.as_str())),
            class_moving: buckets(rows.iter().map(|s| s.class_moving.as_str())),
            test_centre: buckets(rows.iter().map(|s| s.test_centre.as_str())),
            scholarship: buckets(rows.iter().map(|s| yes_no(s.scholarship_offered))),
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemorySettingsRepository {
    settings: RwLock<Option<Settings>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn get_or_create(&self) -> DbResult<Settings> {
        let mut settings = self.settings.write().await;
        Ok(settings.get_or_insert_with(Settings::default).clone())
    }

    async fn update(&self, update: UpdateSettingsDto) -> DbResult<Settings> {
        let mut settings = self.settings.write().await;
        let current = settings.get_or_insert_with(Settings::default);
        current.apply(update);
        Ok(current.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAdminRepository {
    admins: RwLock<HashMap<String, Admin>>,
}

impl InMemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminRepository for InMemoryAdminRepository {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<Admin>> {
        Ok(self.admins.read().await.get(username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> DbResult<Admin> {
        let mut admins = self.admins.write().await;
        if admins.contains_key(username) {
            return Err(DbError::Conflict(format!("admin '{username}'")));
        }

        let admin = Admin {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        admins.insert(username.to_string(), admin.clone());
        Ok(admin)
    }
}
