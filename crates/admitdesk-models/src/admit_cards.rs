//! Bulk admit card requests and tallies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::StudentId;

/// Students picked in the admin list.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkSelectionRequest {
    #[serde(default)]
    #[schema(value_type = Vec<String>, example = json!(["STU0001", "STU0002"]))]
    pub selected_students: Vec<StudentId>,
}

/// A student left out of a batch, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SkippedStudent {
    pub id: StudentId,
    pub reason: String,
}

impl SkippedStudent {
    pub fn new(id: StudentId, reason: impl Into<String>) -> Self {
        Self {
            id,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBatchOutcome {
    /// Cards generated by this run. Already-generated students are not counted.
    pub generated_count: usize,
    pub generated_ids: Vec<StudentId>,
    pub failed: Vec<SkippedStudent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendBatchOutcome {
    pub sent_ids: Vec<StudentId>,
    pub skipped: Vec<SkippedStudent>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateBatchResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub outcome: GenerateBatchOutcome,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendBatchResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub outcome: SendBatchOutcome,
}
