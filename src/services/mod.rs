pub mod attempt_service;
pub mod content_service;
pub mod enrollment_service;
pub mod module_service;
pub mod program_service;
pub mod progress_service;
pub mod sequencer;

pub use attempt_service::AttemptService;
pub use content_service::ContentService;
pub use enrollment_service::EnrollmentService;
pub use module_service::ModuleService;
pub use program_service::ProgramService;
pub use progress_service::{ProgressService, ProgressUpdate};
