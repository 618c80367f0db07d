use async_trait::async_trait;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

#[cfg(test)]
use mockall::automock;

use crate::{db::Database, errors::AppResult, models::domain::Assessment};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    async fn create(&self, assessment: Assessment) -> AppResult<Assessment>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Assessment>>;
    async fn find_by_content_item(&self, content_item_id: &str)
        -> AppResult<Option<Assessment>>;
    /// Whole-document replace. Questions and options are embedded, so edits
    /// to them (add, reorder, remove) commit atomically with this one write.
    async fn update(&self, assessment: Assessment) -> AppResult<Assessment>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoAssessmentRepository {
    collection: Collection<Assessment>,
}

impl MongoAssessmentRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("assessments");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for assessments collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let content_item_index = IndexModel::builder()
            .keys(doc! { "content_item_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("content_item_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(content_item_index).await?;
        Ok(())
    }
}

#[async_trait]
impl AssessmentRepository for MongoAssessmentRepository {
    async fn create(&self, assessment: Assessment) -> AppResult<Assessment> {
        self.collection.insert_one(&assessment).await?;
        Ok(assessment)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Assessment>> {
        let assessment = self.collection.find_one(doc! { "id": id }).await?;
        Ok(assessment)
    }

    async fn find_by_content_item(
        &self,
        content_item_id: &str,
    ) -> AppResult<Option<Assessment>> {
        let assessment = self
            .collection
            .find_one(doc! { "content_item_id": content_item_id })
            .await?;
        Ok(assessment)
    }

    async fn update(&self, assessment: Assessment) -> AppResult<Assessment> {
        self.collection
            .replace_one(doc! { "id": &assessment.id }, &assessment)
            .await?;
        Ok(assessment)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.collection.delete_one(doc! { "id": id }).await?;
        Ok(())
    }
}
