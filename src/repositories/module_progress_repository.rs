use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

#[cfg(test)]
use mockall::automock;

use crate::{db::Database, errors::AppResult, models::domain::ModuleProgress};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModuleProgressRepository: Send + Sync {
    async fn find_by_enrollment(&self, enrollment_id: &str) -> AppResult<Vec<ModuleProgress>>;
    async fn find_by_enrollment_and_module(
        &self,
        enrollment_id: &str,
        module_id: &str,
    ) -> AppResult<Option<ModuleProgress>>;
    async fn upsert(&self, progress: ModuleProgress) -> AppResult<ModuleProgress>;
}

pub struct MongoModuleProgressRepository {
    collection: Collection<ModuleProgress>,
}

impl MongoModuleProgressRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("module_progress");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for module_progress collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        // One row per (patient, module, enrollment).
        let row_index = IndexModel::builder()
            .keys(doc! { "enrollment_id": 1, "module_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("enrollment_module_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(row_index).await?;
        Ok(())
    }
}

#[async_trait]
impl ModuleProgressRepository for MongoModuleProgressRepository {
    async fn find_by_enrollment(&self, enrollment_id: &str) -> AppResult<Vec<ModuleProgress>> {
        let rows = self
            .collection
            .find(doc! { "enrollment_id": enrollment_id })
            .await?
            .try_collect()
            .await?;
        Ok(rows)
    }

    async fn find_by_enrollment_and_module(
        &self,
        enrollment_id: &str,
        module_id: &str,
    ) -> AppResult<Option<ModuleProgress>> {
        let row = self
            .collection
            .find_one(doc! {
                "enrollment_id": enrollment_id,
                "module_id": module_id
            })
            .await?;
        Ok(row)
    }

    async fn upsert(&self, progress: ModuleProgress) -> AppResult<ModuleProgress> {
        self.collection
            .replace_one(
                doc! {
                    "enrollment_id": &progress.enrollment_id,
                    "module_id": &progress.module_id
                },
                &progress,
            )
            .upsert(true)
            .await?;
        Ok(progress)
    }
}
