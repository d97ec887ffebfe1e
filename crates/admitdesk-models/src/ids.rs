//! Student identifiers.
//!
//! A student id is `STU` followed by the allocator sequence, zero-padded to
//! four digits (`STU0001`). Sequences above 9999 simply widen (`STU10000`).

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Key of the counter row that feeds the allocator.
pub const STUDENT_ID_COUNTER: &str = "studentId";

const PREFIX: &str = "STU";
const PAD: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStudentId(pub String);

impl fmt::Display for InvalidStudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid student id", self.0)
    }
}

impl std::error::Error for InvalidStudentId {}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "STU0001")]
pub struct StudentId(String);

impl StudentId {
    /// Formats an allocator sequence value.
    pub fn from_sequence(seq: i64) -> Self {
        Self(format!("{}{:0width$}", PREFIX, seq, width = PAD))
    }

    /// Parses `STU` + at least four digits.
    pub fn parse(raw: &str) -> Result<Self, InvalidStudentId> {
        let raw = raw.trim();
        let digits = raw
            .strip_prefix(PREFIX)
            .ok_or_else(|| InvalidStudentId(raw.to_string()))?;

        if digits.len() < PAD || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidStudentId(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric part of the id, when it has one.
    pub fn sequence(&self) -> Option<i64> {
        self.0.strip_prefix(PREFIX)?.parse().ok()
    }
}

impl fmt::Debug for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StudentId({})", self.0)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StudentId {
    type Err = InvalidStudentId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for StudentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<StudentId> for String {
    fn from(id: StudentId) -> String {
        id.0
    }
}

impl PartialEq<str> for StudentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StudentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Type<sqlx::Postgres> for StudentId {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for StudentId {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for StudentId {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Self::new_unchecked(s))
    }
}

impl PgHasArrayType for StudentId {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}
