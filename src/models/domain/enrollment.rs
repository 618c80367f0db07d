use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Assigned,
    InProgress,
    Completed,
    Dropped,
}

impl EnrollmentStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, EnrollmentStatus::Assigned | EnrollmentStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Assigned => "assigned",
            EnrollmentStatus::InProgress => "in_progress",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Dropped => "dropped",
        }
    }

    /// Legal transitions: assigned -> in_progress -> completed, with dropped
    /// reachable from either active state. Completed and dropped are terminal.
    pub fn can_transition_to(&self, next: EnrollmentStatus) -> bool {
        use EnrollmentStatus::*;
        matches!(
            (self, next),
            (Assigned, InProgress)
                | (Assigned, Completed)
                | (Assigned, Dropped)
                | (InProgress, Completed)
                | (InProgress, Dropped)
        )
    }

    pub fn check_transition(&self, next: EnrollmentStatus) -> AppResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::ValidationError(format!(
                "illegal enrollment status transition: {} -> {}",
                self.as_str(),
                next.as_str()
            )))
        }
    }
}

/// Links a patient to a category with a lifecycle status. At most one
/// category enrollment per patient may be active at any time.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryEnrollment {
    pub id: String,
    pub patient_id: String,
    pub category_id: String,
    pub start_date: NaiveDate,
    pub status: EnrollmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl CategoryEnrollment {
    pub fn new(patient_id: &str, category_id: &str, start_date: NaiveDate) -> Self {
        CategoryEnrollment {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            category_id: category_id.to_string(),
            start_date,
            status: EnrollmentStatus::InProgress,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }
}

/// Links a patient to a program, anchored to a category enrollment when one
/// exists. Same at-most-one-active invariant, scoped per patient.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProgramEnrollment {
    pub id: String,
    pub patient_id: String,
    pub program_id: String,
    pub category_enrollment_id: Option<String>,
    pub enrolled_by: String,
    pub start_date: NaiveDate,
    pub expected_end_date: Option<NaiveDate>,
    pub completed_date: Option<DateTime<Utc>>,
    pub status: EnrollmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl ProgramEnrollment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        patient_id: &str,
        program_id: &str,
        category_enrollment_id: Option<&str>,
        enrolled_by: &str,
        start_date: NaiveDate,
        expected_end_date: Option<NaiveDate>,
    ) -> Self {
        ProgramEnrollment {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            program_id: program_id.to_string(),
            category_enrollment_id: category_enrollment_id.map(|id| id.to_string()),
            enrolled_by: enrolled_by.to_string(),
            start_date,
            expected_end_date,
            completed_date: None,
            status: EnrollmentStatus::InProgress,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }
}
