use std::sync::Arc;

use chrono::Utc;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{EnrollmentStatus, ModuleProgress, ProgressStatus},
    repositories::{ModuleProgressRepository, ModuleRepository, ProgramEnrollmentRepository},
};

/// Result of a progress write, including whether the write promoted the
/// owning enrollment to completed.
#[derive(Debug)]
pub struct ProgressUpdate {
    pub progress: ModuleProgress,
    pub enrollment_completed: bool,
}

/// Records per-module completion per enrollment and promotes the enrollment
/// to completed once every required module is done.
pub struct ProgressService {
    module_repository: Arc<dyn ModuleRepository>,
    enrollment_repository: Arc<dyn ProgramEnrollmentRepository>,
    progress_repository: Arc<dyn ModuleProgressRepository>,
}

impl ProgressService {
    pub fn new(
        module_repository: Arc<dyn ModuleRepository>,
        enrollment_repository: Arc<dyn ProgramEnrollmentRepository>,
        progress_repository: Arc<dyn ModuleProgressRepository>,
    ) -> Self {
        Self {
            module_repository,
            enrollment_repository,
            progress_repository,
        }
    }

    /// Upserts the progress row for the patient's current enrollment of the
    /// module's program. The required-module completion scan runs
    /// synchronously after a `completed` write; a missed promotion heals on
    /// the next completion write, not on read.
    pub async fn set_module_status(
        &self,
        patient_id: &str,
        module_id: &str,
        status: ProgressStatus,
        time_spent_seconds: Option<i64>,
    ) -> AppResult<ProgressUpdate> {
        let module = self
            .module_repository
            .find_by_id(module_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Module with id '{}' not found", module_id))
            })?;

        let enrollment = self
            .enrollment_repository
            .find_current_by_patient_and_program(patient_id, &module.program_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No current enrollment for patient '{}' in program '{}'",
                    patient_id, module.program_id
                ))
            })?;

        let mut progress = self
            .progress_repository
            .find_by_enrollment_and_module(&enrollment.id, module_id)
            .await?
            .unwrap_or_else(|| ModuleProgress::seed(patient_id, module_id, &enrollment.id));

        progress.apply_status(status);
        if let Some(seconds) = time_spent_seconds {
            progress.time_spent_seconds += seconds;
        }
        let progress = self.progress_repository.upsert(progress).await?;

        let enrollment_completed = if status == ProgressStatus::Completed {
            self.promote_if_required_complete(&enrollment.id, &module.program_id)
                .await?
        } else {
            false
        };

        Ok(ProgressUpdate {
            progress,
            enrollment_completed,
        })
    }

    /// Promotes the enrollment to completed when every required module of
    /// the program has a completed progress row. Optional modules never
    /// block or trigger the promotion.
    async fn promote_if_required_complete(
        &self,
        enrollment_id: &str,
        program_id: &str,
    ) -> AppResult<bool> {
        let modules = self.module_repository.find_by_program(program_id).await?;
        let progress = self
            .progress_repository
            .find_by_enrollment(enrollment_id)
            .await?;

        let all_required_done = modules
            .iter()
            .filter(|m| m.is_required)
            .all(|m| {
                progress
                    .iter()
                    .any(|p| p.module_id == m.id && p.status == ProgressStatus::Completed)
            });

        if !all_required_done {
            return Ok(false);
        }

        let mut enrollment = match self.enrollment_repository.find_by_id(enrollment_id).await? {
            Some(e) => e,
            None => return Ok(false),
        };

        if !enrollment.status.can_transition_to(EnrollmentStatus::Completed) {
            // Already terminal; nothing to promote.
            return Ok(false);
        }

        enrollment.status = EnrollmentStatus::Completed;
        enrollment.completed_date = Some(Utc::now());
        enrollment.modified_at = Some(Utc::now());
        self.enrollment_repository.update(enrollment).await?;

        log::info!(
            "enrollment {} auto-completed: all required modules of program {} done",
            enrollment_id,
            program_id
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{Module, ProgramEnrollment};
    use crate::repositories::{
        enrollment_repository::MockProgramEnrollmentRepository,
        module_progress_repository::MockModuleProgressRepository,
        module_repository::MockModuleRepository,
    };
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid date literal")
    }

    fn module(id: &str, program_id: &str, required: bool) -> Module {
        let mut m = Module::new(program_id, id, None, 1, None, required);
        m.id = id.to_string();
        m
    }

    fn enrollment(id: &str, program_id: &str) -> ProgramEnrollment {
        let mut e = ProgramEnrollment::new(
            "patient-1",
            program_id,
            None,
            "admin-1",
            date("2024-01-01"),
            None,
        );
        e.id = id.to_string();
        e
    }

    fn completed_row(module_id: &str, enrollment_id: &str) -> ModuleProgress {
        let mut p = ModuleProgress::seed("patient-1", module_id, enrollment_id);
        p.apply_status(ProgressStatus::Completed);
        p
    }

    fn mocks_for_completion_scan(
        progress_rows: Vec<ModuleProgress>,
        expect_promotion: bool,
    ) -> ProgressService {
        let mut modules = MockModuleRepository::new();
        let mut enrollments = MockProgramEnrollmentRepository::new();
        let mut progress = MockModuleProgressRepository::new();

        modules
            .expect_find_by_id()
            .returning(|id| Ok(Some(module(id, "prog-1", true))));
        modules.expect_find_by_program().returning(|_| {
            Ok(vec![
                module("mod-a", "prog-1", true),
                module("mod-b", "prog-1", true),
                module("mod-c", "prog-1", false),
            ])
        });

        enrollments
            .expect_find_current_by_patient_and_program()
            .returning(|_, _| Ok(Some(enrollment("enr-1", "prog-1"))));
        enrollments
            .expect_find_by_id()
            .returning(|_| Ok(Some(enrollment("enr-1", "prog-1"))));

        if expect_promotion {
            enrollments
                .expect_update()
                .times(1)
                .withf(|e| {
                    e.status == EnrollmentStatus::Completed && e.completed_date.is_some()
                })
                .returning(|e| Ok(e));
        } else {
            enrollments.expect_update().never();
        }

        progress
            .expect_find_by_enrollment_and_module()
            .returning(|_, _| Ok(None));
        progress.expect_upsert().returning(|p| Ok(p));
        progress
            .expect_find_by_enrollment()
            .returning(move |_| Ok(progress_rows.clone()));

        ProgressService::new(Arc::new(modules), Arc::new(enrollments), Arc::new(progress))
    }

    #[tokio::test]
    async fn completing_last_required_module_promotes_enrollment() {
        // mod-a and mod-b are required; mod-c optional and untouched.
        let rows = vec![
            completed_row("mod-a", "enr-1"),
            completed_row("mod-b", "enr-1"),
        ];
        let service = mocks_for_completion_scan(rows, true);

        let update = service
            .set_module_status("patient-1", "mod-b", ProgressStatus::Completed, None)
            .await
            .expect("status write should succeed");

        assert!(update.enrollment_completed);
        assert_eq!(update.progress.status, ProgressStatus::Completed);
        assert!(update.progress.completed_at.is_some());
    }

    #[tokio::test]
    async fn incomplete_required_module_blocks_promotion() {
        // Only mod-a done; mod-b still missing.
        let rows = vec![completed_row("mod-a", "enr-1")];
        let service = mocks_for_completion_scan(rows, false);

        let update = service
            .set_module_status("patient-1", "mod-a", ProgressStatus::Completed, None)
            .await
            .expect("status write should succeed");

        assert!(!update.enrollment_completed);
    }

    #[tokio::test]
    async fn in_progress_write_never_triggers_scan() {
        let mut modules = MockModuleRepository::new();
        let mut enrollments = MockProgramEnrollmentRepository::new();
        let mut progress = MockModuleProgressRepository::new();

        modules
            .expect_find_by_id()
            .returning(|id| Ok(Some(module(id, "prog-1", true))));
        modules.expect_find_by_program().never();
        enrollments
            .expect_find_current_by_patient_and_program()
            .returning(|_, _| Ok(Some(enrollment("enr-1", "prog-1"))));
        progress
            .expect_find_by_enrollment_and_module()
            .returning(|_, _| Ok(None));
        progress.expect_upsert().returning(|p| Ok(p));

        let service =
            ProgressService::new(Arc::new(modules), Arc::new(enrollments), Arc::new(progress));
        let update = service
            .set_module_status("patient-1", "mod-a", ProgressStatus::InProgress, Some(120))
            .await
            .expect("status write should succeed");

        assert!(!update.enrollment_completed);
        assert_eq!(update.progress.time_spent_seconds, 120);
        assert!(update.progress.started_at.is_some());
    }
}
