//! Roll number assignment.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::StudentId;
use crate::students::Stream;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RollNumberOrder {
    /// By case-insensitive name, ties broken by student id.
    #[default]
    Alphabetical,
    /// Uniform shuffle per stream.
    Random,
}

impl RollNumberOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::Random => "random",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct GenerateRollNumbersRequest {
    #[serde(default)]
    pub order: RollNumberOrder,
}

/// One student's new roll number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollAssignment {
    pub student_id: StudentId,
    pub stream: Stream,
    pub roll_no: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateRollNumbersResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub order: RollNumberOrder,
}
