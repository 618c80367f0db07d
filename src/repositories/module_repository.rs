use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

#[cfg(test)]
use mockall::automock;

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Module,
    services::sequencer::SequenceUpdate,
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    async fn create(&self, module: Module) -> AppResult<Module>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Module>>;
    /// Modules of a program, ordered by sequence number.
    async fn find_by_program(&self, program_id: &str) -> AppResult<Vec<Module>>;
    async fn update(&self, module: Module) -> AppResult<Module>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn count_by_program(&self, program_id: &str) -> AppResult<u64>;
    /// Applies a sequencer plan as one atomic unit. A partially applied plan
    /// would leave duplicate or gapped sequence numbers.
    async fn apply_sequence_updates(&self, updates: Vec<SequenceUpdate>) -> AppResult<()>;
}

pub struct MongoModuleRepository {
    db: Database,
    collection: Collection<Module>,
}

impl MongoModuleRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("modules");
        Self {
            db: db.clone(),
            collection,
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for modules collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let program_sequence_index = IndexModel::builder()
            .keys(doc! { "program_id": 1, "sequence_number": 1 })
            .options(
                IndexOptions::builder()
                    .name("program_sequence".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(program_sequence_index).await?;
        Ok(())
    }
}

#[async_trait]
impl ModuleRepository for MongoModuleRepository {
    async fn create(&self, module: Module) -> AppResult<Module> {
        self.collection.insert_one(&module).await?;
        Ok(module)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Module>> {
        let module = self.collection.find_one(doc! { "id": id }).await?;
        Ok(module)
    }

    async fn find_by_program(&self, program_id: &str) -> AppResult<Vec<Module>> {
        let modules = self
            .collection
            .find(doc! { "program_id": program_id })
            .sort(doc! { "sequence_number": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(modules)
    }

    async fn update(&self, module: Module) -> AppResult<Module> {
        self.collection
            .replace_one(doc! { "id": &module.id }, &module)
            .await?;
        Ok(module)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.collection.delete_one(doc! { "id": id }).await?;
        Ok(())
    }

    async fn count_by_program(&self, program_id: &str) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "program_id": program_id })
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
