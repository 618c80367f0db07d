use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of a program containing ordered content items.
///
/// Invariant: `sequence_number` values for all modules of one program form a
/// contiguous 1..count range with no gaps or duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Module {
    pub id: String,
    pub program_id: String,
    pub title: String,
    pub description: Option<String>,
    pub sequence_number: i32,
    pub estimated_minutes: Option<i32>,
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Module {
    pub fn new(
        program_id: &str,
        title: &str,
        description: Option<&str>,
        sequence_number: i32,
        estimated_minutes: Option<i32>,
        is_required: bool,
    ) -> Self {
        Module {
            id: Uuid::new_v4().to_string(),
            program_id: program_id.to_string(),
            title: title.to_string(),
            description: description.map(|d| d.to_string()),
            sequence_number,
            estimated_minutes,
            is_required,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }
}
