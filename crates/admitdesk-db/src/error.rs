use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A unique constraint rejected the write.
    #[error("{0} already exists")]
    Conflict(String),
}

impl DbError {
    /// Maps unique violations (SQLSTATE 23505) to [`DbError::Conflict`].
    pub fn from_unique(err: sqlx::Error, what: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict(what.into()),
            _ => Self::Sqlx(err),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
