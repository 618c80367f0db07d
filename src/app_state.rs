use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoAssessmentRepository, MongoAttemptRepository, MongoCategoryEnrollmentRepository,
        MongoCategoryRepository, MongoContentItemRepository, MongoModuleProgressRepository,
        MongoModuleRepository, MongoProgramEnrollmentRepository, MongoProgramRepository,
    },
    services::{
        attempt_service::AttemptService, content_service::ContentService,
        enrollment_service::EnrollmentService, module_service::ModuleService,
        program_service::ProgramService, progress_service::ProgressService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub program_service: Arc<ProgramService>,
    pub module_service: Arc<ModuleService>,
    pub content_service: Arc<ContentService>,
    pub enrollment_service: Arc<EnrollmentService>,
    pub progress_service: Arc<ProgressService>,
    pub attempt_service: Arc<AttemptService>,
    pub db: Database,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let category_repository = Arc::new(MongoCategoryRepository::new(&db));
        category_repository.ensure_indexes().await?;

        let program_repository = Arc::new(MongoProgramRepository::new(&db));
        program_repository.ensure_indexes().await?;

        let module_repository = Arc::new(MongoModuleRepository::new(&db));
        module_repository.ensure_indexes().await?;

        let content_item_repository = Arc::new(MongoContentItemRepository::new(&db));
        content_item_repository.ensure_indexes().await?;

        let assessment_repository = Arc::new(MongoAssessmentRepository::new(&db));
        assessment_repository.ensure_indexes().await?;

        let category_enrollment_repository = Arc::new(MongoCategoryEnrollmentRepository::new(&db));
        category_enrollment_repository.ensure_indexes().await?;

        let program_enrollment_repository = Arc::new(MongoProgramEnrollmentRepository::new(&db));
        program_enrollment_repository.ensure_indexes().await?;

        let progress_repository = Arc::new(MongoModuleProgressRepository::new(&db));
        progress_repository.ensure_indexes().await?;

        let attempt_repository = Arc::new(MongoAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let program_service = Arc::new(ProgramService::new(
            category_repository.clone(),
            program_repository.clone(),
            module_repository.clone(),
        ));
        let module_service = Arc::new(ModuleService::new(
            program_repository.clone(),
            module_repository.clone(),
            content_item_repository.clone(),
        ));
        let content_service = Arc::new(ContentService::new(
            module_repository.clone(),
            content_item_repository,
            assessment_repository.clone(),
        ));
        let enrollment_service = Arc::new(EnrollmentService::new(
            category_repository,
            program_repository,
            module_repository.clone(),
            category_enrollment_repository,
            program_enrollment_repository.clone(),
        ));
        let progress_service = Arc::new(ProgressService::new(
            module_repository,
            program_enrollment_repository,
            progress_repository,
        ));
        let attempt_service = Arc::new(AttemptService::new(
            assessment_repository,
            attempt_repository,
        ));

        Ok(Self {
            program_service,
            module_service,
            content_service,
            enrollment_service,
            progress_service,
            attempt_service,
            db,
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
