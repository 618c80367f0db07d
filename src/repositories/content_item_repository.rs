use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

#[cfg(test)]
use mockall::automock;

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::ContentItem,
    services::sequencer::SequenceUpdate,
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContentItemRepository: Send + Sync {
    async fn create(&self, item: ContentItem) -> AppResult<ContentItem>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<ContentItem>>;
    /// Content items of a module, ordered by sequence number.
    async fn find_by_module(&self, module_id: &str) -> AppResult<Vec<ContentItem>>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn count_by_module(&self, module_id: &str) -> AppResult<u64>;
    async fn apply_sequence_updates(&self, updates: Vec<SequenceUpdate>) -> AppResult<()>;
}

pub struct MongoContentItemRepository {
    db: Database,
    collection: Collection<ContentItem>,
}

impl MongoContentItemRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("content_items");
        Self {
            db: db.clone(),
            collection,
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for content_items collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let module_sequence_index = IndexModel::builder()
            .keys(doc! { "module_id": 1, "sequence_number": 1 })
            .options(
                IndexOptions::builder()
                    .name("module_sequence".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(module_sequence_index).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentItemRepository for MongoContentItemRepository {
    async fn create(&self, item: ContentItem) -> AppResult<ContentItem> {
        self.collection.insert_one(&item).await?;
        Ok(item)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<ContentItem>> {
        let item = self.collection.find_one(doc! { "id": id }).await?;
        Ok(item)
    }

    async fn find_by_module(&self, module_id: &str) -> AppResult<Vec<ContentItem>> {
        let items = self
            .collection
            .find(doc! { "module_id": module_id })
            .sort(doc! { "sequence_number": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(items)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.collection.delete_one(doc! { "id": id }).await?;
        Ok(())
    }

    async fn count_by_module(&self, module_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "module_id": module_id })
            .await?;
        Ok(count)
    }

    async fn apply_sequence_updates(&self, updates: Vec<SequenceUpdate>) -> AppResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut session = self.db.start_session().await?;
        session
            .start_transaction()
            .await
            .map_err(|e| AppError::TransactionError(e.to_string()))?;

        for update in &updates {
            let result = self
                .collection
                .update_one(
                    doc! { "id": &update.id },
                    doc! { "$set": { "sequence_number": update.sequence_number } },
                )
                .session(&mut session)
                .await;

            if let Err(err) = result {
                let _ = session.abort_transaction().await;
                return Err(AppError::TransactionError(err.to_string()));
            }
        }

        session
            .commit_transaction()
            .await
            .map_err(|e| AppError::TransactionError(e.to_string()))?;
        Ok(())
    }
}
