//! Dashboard statistics.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_students: i64,
    pub pcm_count: i64,
    pub pcb_count: i64,
    pub admit_card_generated: i64,
    pub admit_card_sent: i64,
    pub roll_numbers_assigned: i64,
}

/// One bar of a distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CountBucket {
    pub name: String,
    pub count: i64,
}

impl CountBucket {
    /// Sorts by count descending, then name.
    pub fn sort(buckets: &mut [CountBucket]) {
        buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub gender: Vec<CountBucket>,
    pub stream: Vec<CountBucket>,
    pub target: Vec<CountBucket>,
    pub class_moving: Vec<CountBucket>,
    pub test_centre: Vec<CountBucket>,
    pub scholarship: Vec<CountBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_count_then_name() {
        let mut buckets = vec![
            CountBucket { name: "PCB".into(), count: 2 },
            CountBucket { name: "Other".into(), count: 5 },
            CountBucket { name: "PCM".into(), count: 2 },
        ];
        CountBucket::sort(&mut buckets);
        let names: Vec<_> = buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Other", "PCB", "PCM"]);
    }
}
