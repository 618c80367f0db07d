use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    ClientSession, Collection, IndexModel,
};

#[cfg(test)]
use mockall::automock;

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{CategoryEnrollment, ModuleProgress, ProgramEnrollment},
};

const ACTIVE_STATUSES: [&str; 2] = ["assigned", "in_progress"];

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CategoryEnrollmentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<CategoryEnrollment>>;
    async fn find_active_by_patient(&self, patient_id: &str)
        -> AppResult<Option<CategoryEnrollment>>;
    async fn create(&self, enrollment: CategoryEnrollment) -> AppResult<CategoryEnrollment>;
    async fn update(&self, enrollment: CategoryEnrollment) -> AppResult<CategoryEnrollment>;
    /// Drops the prior active enrollment (when one exists), cascades over
    /// the program enrollments anchored to it (dropped, their module
    /// progress hard-deleted), and inserts the replacement. One transaction,
    /// so no observer ever sees two active category enrollments for one
    /// patient or an active program enrollment under a dropped anchor.
    async fn supersede_and_insert(
        &self,
        prior_id: Option<String>,
        enrollment: CategoryEnrollment,
        cascade_enrollment_ids: Vec<String>,
    ) -> AppResult<CategoryEnrollment>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProgramEnrollmentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<ProgramEnrollment>>;
    async fn find_active_by_patient(&self, patient_id: &str) -> AppResult<Vec<ProgramEnrollment>>;
    /// The patient's most recent non-dropped enrollment for a program, used
    /// to resolve which enrollment a progress write belongs to.
    async fn find_current_by_patient_and_program(
        &self,
        patient_id: &str,
        program_id: &str,
    ) -> AppResult<Option<ProgramEnrollment>>;
    async fn find_by_category_enrollment(
        &self,
        category_enrollment_id: &str,
    ) -> AppResult<Vec<ProgramEnrollment>>;
    async fn update(&self, enrollment: ProgramEnrollment) -> AppResult<ProgramEnrollment>;
    /// The supersede-and-reset unit: prior enrollments -> dropped, their
    /// module progress hard-deleted, the new enrollment inserted, and fresh
    /// progress rows seeded. One transaction; all or nothing.
    async fn supersede_and_insert(
        &self,
        prior_ids: Vec<String>,
        enrollment: ProgramEnrollment,
        progress_seeds: Vec<ModuleProgress>,
    ) -> AppResult<ProgramEnrollment>;
}

pub struct MongoCategoryEnrollmentRepository {
    db: Database,
    collection: Collection<CategoryEnrollment>,
    program_collection: Collection<ProgramEnrollment>,
    progress_collection: Collection<ModuleProgress>,
}

impl MongoCategoryEnrollmentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            collection: db.get_collection("category_enrollments"),
            program_collection: db.get_collection("program_enrollments"),
            progress_collection: db.get_collection("module_progress"),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for category_enrollments collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        // Defends the at-most-one-active invariant against concurrent
        // assignment of the same patient.
        let active_index = IndexModel::builder()
            .keys(doc! { "patient_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! {
                        "status": { "$in": ACTIVE_STATUSES.to_vec() }
                    })
                    .name("one_active_per_patient".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(active_index).await?;
        Ok(())
    }
}

#[async_trait]
impl CategoryEnrollmentRepository for MongoCategoryEnrollmentRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<CategoryEnrollment>> {
        let enrollment = self.collection.find_one(doc! { "id": id }).await?;
        Ok(enrollment)
    }

    async fn find_active_by_patient(
        &self,
        patient_id: &str,
    ) -> AppResult<Option<CategoryEnrollment>> {
        let enrollment = self
            .collection
            .find_one(doc! {
                "patient_id": patient_id,
                "status": { "$in": ACTIVE_STATUSES.to_vec() }
            })
            .await?;
        Ok(enrollment)
    }

    async fn create(&self, enrollment: CategoryEnrollment) -> AppResult<CategoryEnrollment> {
        self.collection.insert_one(&enrollment).await?;
        Ok(enrollment)
    }

    async fn update(&self, enrollment: CategoryEnrollment) -> AppResult<CategoryEnrollment> {
        self.collection
            .replace_one(doc! { "id": &enrollment.id }, &enrollment)
            .await?;
        Ok(enrollment)
    }

    async fn supersede_and_insert(
        &self,
        prior_id: Option<String>,
        enrollment: CategoryEnrollment,
        cascade_enrollment_ids: Vec<String>,
    ) -> AppResult<CategoryEnrollment> {
        let mut session = self.db.start_session().await?;
        session
            .start_transaction()
            .await
            .map_err(|e| AppError::TransactionError(e.to_string()))?;

        let result = self
            .supersede_in_session(&mut session, prior_id, &enrollment, &cascade_enrollment_ids)
            .await;

        match result {
            Ok(()) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(|e| AppError::TransactionError(e.to_string()))?;
                Ok(enrollment)
            }
            Err(err) => {
                let _ = session.abort_transaction().await;
                Err(AppError::TransactionError(err.to_string()))
            }
        }
    }
}

impl MongoCategoryEnrollmentRepository {
    async fn supersede_in_session(
        &self,
        session: &mut ClientSession,
        prior_id: Option<String>,
        enrollment: &CategoryEnrollment,
        cascade_enrollment_ids: &[String],
    ) -> AppResult<()> {
        let now = to_bson(&Utc::now())?;

        if !cascade_enrollment_ids.is_empty() {
            self.program_collection
                .update_many(
                    doc! { "id": { "$in": cascade_enrollment_ids.to_vec() } },
                    doc! { "$set": { "status": "dropped", "modified_at": now.clone() } },
                )
                .session(&mut *session)
                .await?;

            // Hard reset: progress under the superseded anchor is forfeited,
            // not archived.
            self.progress_collection
                .delete_many(
                    doc! { "enrollment_id": { "$in": cascade_enrollment_ids.to_vec() } },
                )
                .session(&mut *session)
                .await?;
        }

        if let Some(prior) = prior_id {
            self.collection
                .update_one(
                    doc! { "id": prior },
                    doc! { "$set": { "status": "dropped", "modified_at": now } },
                )
                .session(&mut *session)
                .await?;
        }

        self.collection
            .insert_one(enrollment)
            .session(session)
            .await?;
        Ok(())
    }
}

pub struct MongoProgramEnrollmentRepository {
    db: Database,
    collection: Collection<ProgramEnrollment>,
    progress_collection: Collection<ModuleProgress>,
}

impl MongoProgramEnrollmentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            collection: db.get_collection("program_enrollments"),
            progress_collection: db.get_collection("module_progress"),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for program_enrollments collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let active_index = IndexModel::builder()
            .keys(doc! { "patient_id": 1, "program_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! {
                        "status": { "$in": ACTIVE_STATUSES.to_vec() }
                    })
                    .name("one_active_per_patient_program".to_string())
                    .build(),
            )
            .build();

        let patient_index = IndexModel::builder()
            .keys(doc! { "patient_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("patient_id".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(active_index).await?;
        self.collection.create_index(patient_index).await?;
        Ok(())
    }

    async fn supersede_in_session(
        &self,
        session: &mut ClientSession,
        prior_ids: &[String],
        enrollment: &ProgramEnrollment,
        progress_seeds: &[ModuleProgress],
    ) -> AppResult<()> {
        if !prior_ids.is_empty() {
            let now = to_bson(&Utc::now())?;
            self.collection
                .update_many(
                    doc! { "id": { "$in": prior_ids.to_vec() } },
                    doc! { "$set": { "status": "dropped", "modified_at": now } },
                )
                .session(&mut *session)
                .await?;

            // Hard reset: in-flight progress tied to superseded enrollments
            // is forfeited, not archived.
            self.progress_collection
                .delete_many(doc! { "enrollment_id": { "$in": prior_ids.to_vec() } })
                .session(&mut *session)
                .await?;
        }

        self.collection
            .insert_one(enrollment)
            .session(&mut *session)
            .await?;

        if !progress_seeds.is_empty() {
            self.progress_collection
                .insert_many(progress_seeds)
                .session(session)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ProgramEnrollmentRepository for MongoProgramEnrollmentRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<ProgramEnrollment>> {
        let enrollment = self.collection.find_one(doc! { "id": id }).await?;
        Ok(enrollment)
    }

    async fn find_active_by_patient(&self, patient_id: &str) -> AppResult<Vec<ProgramEnrollment>> {
        let enrollments = self
            .collection
            .find(doc! {
                "patient_id": patient_id,
                "status": { "$in": ACTIVE_STATUSES.to_vec() }
            })
            .await?
            .try_collect()
            .await?;
        Ok(enrollments)
    }

    async fn find_current_by_patient_and_program(
        &self,
        patient_id: &str,
        program_id: &str,
    ) -> AppResult<Option<ProgramEnrollment>> {
        let enrollment = self
            .collection
            .find_one(doc! {
                "patient_id": patient_id,
                "program_id": program_id,
                "status": { "$ne": "dropped" }
            })
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(enrollment)
    }

    async fn find_by_category_enrollment(
        &self,
        category_enrollment_id: &str,
    ) -> AppResult<Vec<ProgramEnrollment>> {
        let enrollments = self
            .collection
            .find(doc! { "category_enrollment_id": category_enrollment_id })
            .await?
            .try_collect()
            .await?;
        Ok(enrollments)
    }

    async fn update(&self, enrollment: ProgramEnrollment) -> AppResult<ProgramEnrollment> {
        self.collection
            .replace_one(doc! { "id": &enrollment.id }, &enrollment)
            .await?;
        Ok(enrollment)
    }

    async fn supersede_and_insert(
        &self,
        prior_ids: Vec<String>,
        enrollment: ProgramEnrollment,
        progress_seeds: Vec<ModuleProgress>,
    ) -> AppResult<ProgramEnrollment> {
        let mut session = self.db.start_session().await?;
        session
            .start_transaction()
            .await
            .map_err(|e| AppError::TransactionError(e.to_string()))?;

        let result = self
            .supersede_in_session(&mut session, &prior_ids, &enrollment, &progress_seeds)
            .await;

        match result {
            Ok(()) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(|e| AppError::TransactionError(e.to_string()))?;
                Ok(enrollment)
            }
            Err(err) => {
                let _ = session.abort_transaction().await;
                Err(AppError::TransactionError(err.to_string()))
            }
        }
    }
}
