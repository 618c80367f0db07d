use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

#[cfg(test)]
use mockall::automock;

use crate::{db::Database, errors::AppResult, models::domain::AssessmentAttempt};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn create(&self, attempt: AssessmentAttempt) -> AppResult<AssessmentAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<AssessmentAttempt>>;
    /// All of a patient's attempts at one assessment, newest first. Attempts
    /// are append-only history; nothing is ever overwritten by a re-take.
    async fn find_by_patient_and_assessment(
        &self,
        patient_id: &str,
        assessment_id: &str,
    ) -> AppResult<Vec<AssessmentAttempt>>;
    async fn update(&self, attempt: AssessmentAttempt) -> AppResult<AssessmentAttempt>;
}

pub struct MongoAttemptRepository {
    collection: Collection<AssessmentAttempt>,
}

impl MongoAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("assessment_attempts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for assessment_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let patient_assessment_index = IndexModel::builder()
            .keys(doc! { "patient_id": 1, "assessment_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("patient_assessment".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(patient_assessment_index).await?;
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for MongoAttemptRepository {
    async fn create(&self, attempt: AssessmentAttempt) -> AppResult<AssessmentAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<AssessmentAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_by_patient_and_assessment(
        &self,
        patient_id: &str,
        assessment_id: &str,
    ) -> AppResult<Vec<AssessmentAttempt>> {
        let attempts = self
            .collection
            .find(doc! {
                "patient_id": patient_id,
                "assessment_id": assessment_id
            })
            .sort(doc! { "started_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn update(&self, attempt: AssessmentAttempt) -> AppResult<AssessmentAttempt> {
        self.collection
            .replace_one(doc! { "id": &attempt.id }, &attempt)
            .await?;
        Ok(attempt)
    }
}
