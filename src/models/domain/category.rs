use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level grouping of treatment programs a patient is assigned to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(name: &str, description: Option<&str>) -> Self {
        Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(|d| d.to_string()),
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }
}
