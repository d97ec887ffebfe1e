//! PostgreSQL repositories.
//!
//! Queries are checked at runtime (`query_as::<_, T>`) so the crate builds
//! without a live database.

use admitdesk_models::admins::Admin;
use admitdesk_models::dashboard::{CountBucket, DashboardStats, SummaryStats};
use admitdesk_models::ids::STUDENT_ID_COUNTER;
use admitdesk_models::roll_numbers::RollAssignment;
use admitdesk_models::settings::{Settings, UpdateSettingsDto};
use admitdesk_models::students::{AdmitCardStatus, NewStudent, Student, StudentFilter};
use admitdesk_models::StudentId;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use super::{AdminRepository, RollPlanner, SettingsRepository, StudentRepository};
use crate::error::{DbError, DbResult};

/// Key for `pg_advisory_xact_lock` held while roll numbers are rewritten.
const ROLL_NUMBER_LOCK_KEY: i64 = 0x0041_444d_5f52_4f4c;

const INCREMENT_COUNTER: &str = "INSERT INTO counters (id, seq) VALUES ($1, 1) \
     ON CONFLICT (id) DO UPDATE SET seq = counters.seq + 1 \
     RETURNING seq";

const RESET_COUNTER: &str = "INSERT INTO counters (id, seq) VALUES ($1, 0) \
     ON CONFLICT (id) DO UPDATE SET seq = 0";

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn id_strings(ids: &[StudentId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_string()).collect()
}

#[derive(Clone)]
pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_by(&self, expr: &'static str) -> DbResult<Vec<CountBucket>> {
        let sql = format!("SELECT {expr} AS name, COUNT(*) AS count FROM students GROUP BY 1");
        let rows: Vec<(String, i64)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        let mut buckets: Vec<CountBucket> = rows
            .into_iter()
            .map(|(name, count)| CountBucket { name, count })
            .collect();
        CountBucket::sort(&mut buckets);
        Ok(buckets)
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    #[instrument(skip(self, new), fields(stream = %new.stream))]
    async fn create(&self, new: NewStudent) -> DbResult<Student> {
        let mut tx = self.pool.begin().await?;

        let seq: i64 = sqlx::query_scalar(INCREMENT_COUNTER)
            .bind(STUDENT_ID_COUNTER)
            .fetch_one(&mut *tx)
            .await?;
        let student_id = StudentId::from_sequence(seq);

        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (
                student_id, student_name, gender, class_moving, date_of_birth,
                stream, target, father_name, mother_name, email,
                permanent_address, present_address, parent_mobile, student_mobile,
                whatsapp_mobile, previous_school, previous_result_percentage,
                test_centre, scholarship_offered, scholarship_details,
                passport_photo_url, identity_photo_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
            RETURNING *
            "#,
        )
        .bind(&student_id)
        .bind(&new.student_name)
        .bind(new.gender)
        .bind(new.class_moving)
        .bind(new.date_of_birth)
        .bind(new.stream)
        .bind(new.target)
        .bind(&new.father_name)
        .bind(&new.mother_name)
        .bind(&new.email)
        .bind(&new.permanent_address)
        .bind(&new.present_address)
        .bind(&new.parent_mobile)
        .bind(&new.student_mobile)
        .bind(&new.whatsapp_mobile)
        .bind(&new.previous_school)
        .bind(new.previous_result_percentage)
        .bind(&new.test_centre)
        .bind(new.scholarship_offered)
        .bind(&new.scholarship_details)
        .bind(&new.passport_photo_url)
        .bind(&new.identity_photo_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DbError::from_unique(e, format!("student {student_id}")))?;

        tx.commit().await?;
        Ok(student)
    }

    async fn find_by_id(&self, id: &StudentId) -> DbResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE student_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    async fn find_many(&self, ids: &[StudentId]) -> DbResult<Vec<Student>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let students =
            sqlx::query_as::<_, Student>("SELECT * FROM students WHERE student_id = ANY($1)")
                .bind(id_strings(ids))
                .fetch_all(&self.pool)
                .await?;
        Ok(students)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &StudentFilter) -> DbResult<Vec<Student>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM students WHERE TRUE");

        if let Some(term) = filter.search_term() {
            let pattern = format!("%{}%", escape_like(term));
            qb.push(" AND (student_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR student_id ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(stream) = filter.stream {
            qb.push(" AND stream = ").push_bind(stream);
        }
        if let Some(target) = filter.target {
            qb.push(" AND target = ").push_bind(target);
        }
        match filter.status {
            Some(AdmitCardStatus::Generated) => {
                qb.push(" AND admit_card_generated AND NOT admit_card_sent");
            }
            Some(AdmitCardStatus::Sent) => {
                qb.push(" AND admit_card_sent");
            }
            Some(AdmitCardStatus::Pending) => {
                qb.push(" AND NOT admit_card_generated AND NOT admit_card_sent");
            }
            None => {}
        }
        qb.push(" ORDER BY created_at DESC, student_id DESC");

        let students = qb.build_query_as::<Student>().fetch_all(&self.pool).await?;
        Ok(students)
    }

    #[instrument(skip(self, planner))]
    async fn assign_roll_numbers(
        &self,
        planner: RollPlanner<'_>,
    ) -> DbResult<Vec<RollAssignment>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ROLL_NUMBER_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let students = sqlx::query_as::<_, Student>("SELECT * FROM students")
            .fetch_all(&mut *tx)
            .await?;
        let assignments = planner(&students);

        sqlx::query("UPDATE students SET roll_no = NULL, updated_at = NOW() WHERE roll_no IS NOT NULL")
            .execute(&mut *tx)
            .await?;

        if !assignments.is_empty() {
            let ids: Vec<String> = assignments
                .iter()
                .map(|a| a.student_id.as_str().to_string())
                .collect();
            let rolls: Vec<i32> = assignments.iter().map(|a| a.roll_no).collect();

            sqlx::query(
                r#"
                UPDATE students AS s
                SET roll_no = v.roll_no, updated_at = NOW()
                FROM UNNEST($1::text[], $2::int4[]) AS v(student_id, roll_no)
                WHERE s.student_id = v.student_id
                "#,
            )
            .bind(ids)
            .bind(rolls)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(assignments)
    }

    async fn mark_admit_card_generated(&self, id: &StudentId) -> DbResult<()> {
        sqlx::query(
            "UPDATE students SET admit_card_generated = TRUE, updated_at = NOW() \
             WHERE student_id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_admit_card_sent(&self, id: &StudentId) -> DbResult<()> {
        sqlx::query(
            "UPDATE students SET admit_card_generated = TRUE, admit_card_sent = TRUE, \
             updated_at = NOW() WHERE student_id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_counter(&self) -> DbResult<()> {
        sqlx::query(RESET_COUNTER)
            .bind(STUDENT_ID_COUNTER)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM students")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query(RESET_COUNTER)
            .bind(STUDENT_ID_COUNTER)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted)
    }

    async fn summary(&self) -> DbResult<SummaryStats> {
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE stream = 'PCM'),
                COUNT(*) FILTER (WHERE stream = 'PCB'),
                COUNT(*) FILTER (WHERE admit_card_generated),
                COUNT(*) FILTER (WHERE admit_card_sent),
                COUNT(*) FILTER (WHERE roll_no IS NOT NULL)
            FROM students
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SummaryStats {
            total_students: row.0,
            pcm_count: row.1,
            pcb_count: row.2,
            admit_card_generated: row.3,
            admit_card_sent: row.4,
            roll_numbers_assigned: row.5,
        })
    }

    async fn distributions(&self) -> DbResult<DashboardStats> {
        Ok(DashboardStats {
            gender: self.count_by("gender").await?,
            stream: self.count_by("stream").await?,
            target: self.count_by("target").await?,
            class_moving: self.count_by("class_moving").await?,
            test_centre: self.count_by("test_centre").await?,
            scholarship: self
                .count_by("CASE WHEN scholarship_offered THEN 'Yes' ELSE 'No' END")
                .await?,
        })
    }
}

#[derive(Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_SETTINGS: &str = "SELECT exam_date, last_date_to_register, result_date, \
     registration_open, venue, exam_time, reporting_time, updated_at \
     FROM settings WHERE id = 1";

async fn ensure_settings_row<'c, E>(executor: E) -> DbResult<()>
where
    E: sqlx::PgExecutor<'c>,
{
    let defaults = Settings::default();
    sqlx::query(
        "INSERT INTO settings (id, registration_open, venue, exam_time, reporting_time) \
         VALUES (1, $1, $2, $3, $4) ON CONFLICT (id) DO NOTHING",
    )
    .bind(defaults.registration_open)
    .bind(defaults.venue)
    .bind(defaults.exam_time)
    .bind(defaults.reporting_time)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn get_or_create(&self) -> DbResult<Settings> {
        ensure_settings_row(&self.pool).await?;
        let settings = sqlx::query_as::<_, Settings>(SELECT_SETTINGS)
            .fetch_one(&self.pool)
            .await?;
        Ok(settings)
    }

    #[instrument(skip(self, update))]
    async fn update(&self, update: UpdateSettingsDto) -> DbResult<Settings> {
        let mut tx = self.pool.begin().await?;
        ensure_settings_row(&mut *tx).await?;

        let select_for_update = format!("{} FOR UPDATE", SELECT_SETTINGS);
        let mut settings = sqlx::query_as::<_, Settings>(&select_for_update)
            .fetch_one(&mut *tx)
            .await?;
        settings.apply(update);

        let stored = sqlx::query_as::<_, Settings>(
            r#"
            UPDATE settings
            SET exam_date = $1, last_date_to_register = $2, result_date = $3,
                registration_open = $4, venue = $5, exam_time = $6,
                reporting_time = $7, updated_at = NOW()
            WHERE id = 1
            RETURNING exam_date, last_date_to_register, result_date,
                      registration_open, venue, exam_time, reporting_time, updated_at
            "#,
        )
        .bind(&settings.exam_date)
        .bind(&settings.last_date_to_register)
        .bind(&settings.result_date)
        .bind(settings.registration_open)
        .bind(&settings.venue)
        .bind(&settings.exam_time)
        .bind(&settings.reporting_time)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(stored)
    }
}

#[derive(Clone)]
pub struct PgAdminRepository {
    pool: PgPool,
}

impl PgAdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminRepository for PgAdminRepository {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, password_hash, created_at FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    #[instrument(skip(self, password_hash))]
    async fn create(&self, username: &str, password_hash: &str) -> DbResult<Admin> {
        sqlx::query_as::<_, Admin>(
            "INSERT INTO admins (id, username, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, username, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_unique(e, format!("admin '{username}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("STU0001"), "STU0001");
    }
}
