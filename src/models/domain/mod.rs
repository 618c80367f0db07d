pub mod assessment;
pub mod attempt;
pub mod category;
pub mod content_item;
pub mod enrollment;
pub mod module;
pub mod module_progress;
pub mod program;

pub use assessment::{Assessment, Question, QuestionOption, QuestionType};
pub use attempt::{AssessmentAttempt, QuestionResponse, ResponseGrade};
pub use category::Category;
pub use content_item::{ContentItem, ContentType};
pub use enrollment::{CategoryEnrollment, EnrollmentStatus, ProgramEnrollment};
pub use module::Module;
pub use module_progress::{ModuleProgress, ProgressStatus};
pub use program::Program;
