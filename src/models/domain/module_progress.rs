use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Per-module completion state for one enrollment. Seeded `not_started` for
/// every module of a program at enrollment time; one row per
/// (patient, module, enrollment).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModuleProgress {
    pub id: String,
    pub patient_id: String,
    pub module_id: String,
    pub enrollment_id: String,
    pub status: ProgressStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_spent_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl ModuleProgress {
    pub fn seed(patient_id: &str, module_id: &str, enrollment_id: &str) -> Self {
        ModuleProgress {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            module_id: module_id.to_string(),
            enrollment_id: enrollment_id.to_string(),
            status: ProgressStatus::NotStarted,
            started_at: None,
            completed_at: None,
            time_spent_seconds: 0,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    /// Applies a status change with the matching timestamp stamping.
    pub fn apply_status(&mut self, status: ProgressStatus) {
        match status {
            ProgressStatus::InProgress => {
                if self.started_at.is_none() {
                    self.started_at = Some(Utc::now());
                }
            }
            ProgressStatus::Completed => {
                if self.started_at.is_none() {
                    self.started_at = Some(Utc::now());
                }
                self.completed_at = Some(Utc::now());
            }
            ProgressStatus::NotStarted => {}
        }
        self.status = status;
        self.modified_at = Some(Utc::now());
    }
}
