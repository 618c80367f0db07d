use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

#[cfg(test)]
use mockall::automock;

use crate::{db::Database, errors::AppResult, models::domain::Program};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    async fn create(&self, program: Program) -> AppResult<Program>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Program>>;
    async fn find_by_category(&self, category_id: &str) -> AppResult<Vec<Program>>;
    async fn update(&self, program: Program) -> AppResult<Program>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

pub struct MongoProgramRepository {
    collection: Collection<Program>,
}

impl MongoProgramRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("programs");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for programs collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let category_index = IndexModel::builder()
            .keys(doc! { "category_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("category_id".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(category_index).await?;
        Ok(())
    }
}

#[async_trait]
impl ProgramRepository for MongoProgramRepository {
    async fn create(&self, program: Program) -> AppResult<Program> {
        self.collection.insert_one(&program).await?;
        Ok(program)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Program>> {
        let program = self.collection.find_one(doc! { "id": id }).await?;
        Ok(program)
    }

    async fn find_by_category(&self, category_id: &str) -> AppResult<Vec<Program>> {
        let programs = self
            .collection
            .find(doc! { "category_id": category_id })
            .sort(doc! { "title": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(programs)
    }

    async fn update(&self, program: Program) -> AppResult<Program> {
        self.collection
            .replace_one(doc! { "id": &program.id }, &program)
            .await?;
        Ok(program)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.collection.delete_one(doc! { "id": id }).await?;
        Ok(())
    }
}
