pub mod assessment_repository;
pub mod attempt_repository;
pub mod category_repository;
pub mod content_item_repository;
pub mod enrollment_repository;
pub mod module_progress_repository;
pub mod module_repository;
pub mod program_repository;

pub use assessment_repository::{AssessmentRepository, MongoAssessmentRepository};
pub use attempt_repository::{AttemptRepository, MongoAttemptRepository};
pub use category_repository::{CategoryRepository, MongoCategoryRepository};
pub use content_item_repository::{ContentItemRepository, MongoContentItemRepository};
pub use enrollment_repository::{
    CategoryEnrollmentRepository, MongoCategoryEnrollmentRepository,
    MongoProgramEnrollmentRepository, ProgramEnrollmentRepository,
};
pub use module_progress_repository::{ModuleProgressRepository, MongoModuleProgressRepository};
pub use module_repository::{ModuleRepository, MongoModuleRepository};
pub use program_repository::{MongoProgramRepository, ProgramRepository};
