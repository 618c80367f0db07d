use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Document,
    Link,
    Video,
    Text,
    Assessment,
}

/// A single piece of module content. The `content` payload is opaque to the
/// core; structured types carry JSON-encoded strings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentItem {
    pub id: String,
    pub module_id: String,
    pub title: String,
    pub content_type: ContentType,
    pub content: Option<String>,
    pub sequence_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    pub fn new(
        module_id: &str,
        title: &str,
        content_type: ContentType,
        content: Option<&str>,
        sequence_number: i32,
    ) -> Self {
        ContentItem {
            id: Uuid::new_v4().to_string(),
            module_id: module_id.to_string(),
            title: title.to_string(),
            content_type,
            content: content.map(|c| c.to_string()),
            sequence_number,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }
}
