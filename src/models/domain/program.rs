use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A structured treatment course composed of ordered modules.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Program {
    pub id: String,
    pub category_id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_days: Option<i64>,
    pub is_self_paced: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Program {
    pub fn new(
        category_id: &str,
        title: &str,
        description: Option<&str>,
        duration_days: Option<i64>,
        is_self_paced: bool,
    ) -> Self {
        Program {
            id: Uuid::new_v4().to_string(),
            category_id: category_id.to_string(),
            title: title.to_string(),
            description: description.map(|d| d.to_string()),
            duration_days,
            is_self_paced,
            is_active: true,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }
}
