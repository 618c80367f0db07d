use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            CategoryEnrollment, EnrollmentStatus, ModuleProgress, Program, ProgramEnrollment,
        },
        dto::{request::EnrollMultipleRequest, response::EnrollMultipleResponse},
    },
    repositories::{
        CategoryEnrollmentRepository, CategoryRepository, ModuleRepository,
        ProgramEnrollmentRepository, ProgramRepository,
    },
};

/// Governs the enrollment lifecycle for a patient at category and program
/// scope: assignment, supersede-and-reset on reassignment, batch enrollment,
/// and status transitions.
pub struct EnrollmentService {
    category_repository: Arc<dyn CategoryRepository>,
    program_repository: Arc<dyn ProgramRepository>,
    module_repository: Arc<dyn ModuleRepository>,
    category_enrollment_repository: Arc<dyn CategoryEnrollmentRepository>,
    program_enrollment_repository: Arc<dyn ProgramEnrollmentRepository>,
}

impl EnrollmentService {
    pub fn new(
        category_repository: Arc<dyn CategoryRepository>,
        program_repository: Arc<dyn ProgramRepository>,
        module_repository: Arc<dyn ModuleRepository>,
        category_enrollment_repository: Arc<dyn CategoryEnrollmentRepository>,
        program_enrollment_repository: Arc<dyn ProgramEnrollmentRepository>,
    ) -> Self {
        Self {
            category_repository,
            program_repository,
            module_repository,
            category_enrollment_repository,
            program_enrollment_repository,
        }
    }

    /// Expected end of a program enrollment: start + duration. Self-paced
    /// programs and programs without a configured duration have none.
    pub fn expected_end_date(program: &Program, start_date: NaiveDate) -> Option<NaiveDate> {
        if program.is_self_paced {
            return None;
        }
        program
            .duration_days
            .map(|days| start_date + Duration::days(days))
    }

    /// Assigns a patient to a category. Any active category enrollment is
    /// superseded: the prior record is dropped, the program enrollments
    /// anchored to it are dropped with their progress cleared, and the new
    /// enrollment is inserted active.
    pub async fn assign_category(
        &self,
        patient_id: &str,
        category_id: &str,
        start_date: NaiveDate,
    ) -> AppResult<CategoryEnrollment> {
        self.category_repository
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Category with id '{}' not found", category_id))
            })?;

        let prior = self
            .category_enrollment_repository
            .find_active_by_patient(patient_id)
            .await?;

        self.supersede_anchor(patient_id, category_id, start_date, prior)
            .await
    }

    /// Enrolls a patient in a program, superseding any active program
    /// enrollment for the patient. The supersede, the insert, and the
    /// seeding of fresh `not_started` progress rows commit as one unit.
    pub async fn assign_program(
        &self,
        patient_id: &str,
        program_id: &str,
        start_date: NaiveDate,
        enrolled_by: &str,
    ) -> AppResult<ProgramEnrollment> {
        let program = self
            .program_repository
            .find_by_id(program_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Program with id '{}' not found", program_id))
            })?;

        if !program.is_active {
            return Err(AppError::ValidationError(format!(
                "program '{}' is not active",
                program.title
            )));
        }

        let anchor = self
            .category_enrollment_repository
            .find_active_by_patient(patient_id)
            .await?
            .filter(|e| e.category_id == program.category_id);

        let priors: Vec<String> = self
            .program_enrollment_repository
            .find_active_by_patient(patient_id)
            .await?
            .into_iter()
            .map(|e| e.id)
            .collect();

        self.build_and_insert(
            patient_id,
            &program,
            anchor.as_ref().map(|a| a.id.as_str()),
            priors,
            start_date,
            enrolled_by,
        )
        .await
    }

    /// Batch enrollment into several programs of one category. Targets that
    /// fail validation (wrong category, inactive, unknown) are skipped, not
    /// fatal: callers compare `enrolled_count` to `requested_count`.
    pub async fn enroll_multiple(
        &self,
        request: EnrollMultipleRequest,
    ) -> AppResult<EnrollMultipleResponse> {
        self.category_repository
            .find_by_id(&request.category_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Category with id '{}' not found",
                    request.category_id
                ))
            })?;

        let start_date = request
            .start_date
            .unwrap_or_else(|| Utc::now().date_naive());

        // Reuse the patient's active anchor when it matches the requested
        // category; otherwise supersede it, cascading over the program
        // enrollments anchored to it.
        let active = self
            .category_enrollment_repository
            .find_active_by_patient(&request.patient_id)
            .await?;
        let anchor = match active {
            Some(existing) if existing.category_id == request.category_id => existing,
            other => {
                self.supersede_anchor(&request.patient_id, &request.category_id, start_date, other)
                    .await?
            }
        };

        let requested_count = request.program_ids.len();
        let mut enrollment_ids = Vec::new();

        for program_id in &request.program_ids {
            let program = match self.program_repository.find_by_id(program_id).await? {
                Some(p) => p,
                None => {
                    log::warn!("enroll_multiple: program '{}' not found, skipping", program_id);
                    continue;
                }
            };

            if program.category_id != request.category_id || !program.is_active {
                log::warn!(
                    "enroll_multiple: program '{}' invalid for category '{}', skipping",
                    program_id,
                    request.category_id
                );
                continue;
            }

            let priors: Vec<String> = match self
                .program_enrollment_repository
                .find_current_by_patient_and_program(&request.patient_id, program_id)
                .await?
            {
                Some(existing) if existing.status.is_active() => vec![existing.id],
                _ => Vec::new(),
            };

            let enrollment = self
                .build_and_insert(
                    &request.patient_id,
                    &program,
                    Some(anchor.id.as_str()),
                    priors,
                    start_date,
                    &request.enrolled_by,
                )
                .await?;
            enrollment_ids.push(enrollment.id);
        }

        Ok(EnrollMultipleResponse {
            category_enrollment_id: anchor.id,
            requested_count,
            enrolled_count: enrollment_ids.len(),
            enrollment_ids,
        })
    }

    /// Status transition for a program enrollment, checked against the legal
    /// transition table. Setting `completed` stamps the completion date.
    pub async fn transition_program(
        &self,
        enrollment_id: &str,
        new_status: EnrollmentStatus,
    ) -> AppResult<ProgramEnrollment> {
        let mut enrollment = self
            .program_enrollment_repository
            .find_by_id(enrollment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Enrollment with id '{}' not found", enrollment_id))
            })?;

        enrollment.status.check_transition(new_status)?;
        enrollment.status = new_status;
        if new_status == EnrollmentStatus::Completed {
            enrollment.completed_date = Some(Utc::now());
        }
        enrollment.modified_at = Some(Utc::now());

        self.program_enrollment_repository.update(enrollment).await
    }

    pub async fn transition_category(
        &self,
        enrollment_id: &str,
        new_status: EnrollmentStatus,
    ) -> AppResult<CategoryEnrollment> {
        let mut enrollment = self
            .category_enrollment_repository
            .find_by_id(enrollment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Enrollment with id '{}' not found", enrollment_id))
            })?;

        enrollment.status.check_transition(new_status)?;
        enrollment.status = new_status;
        enrollment.modified_at = Some(Utc::now());

        self.category_enrollment_repository.update(enrollment).await
    }

    /// Inserts a new category anchor for the patient. A prior anchor is
    /// superseded together with the program enrollments anchored to it,
    /// whose progress is cleared, all in one repository transaction.
    async fn supersede_anchor(
        &self,
        patient_id: &str,
        category_id: &str,
        start_date: NaiveDate,
        prior: Option<CategoryEnrollment>,
    ) -> AppResult<CategoryEnrollment> {
        let enrollment = CategoryEnrollment::new(patient_id, category_id, start_date);
        match prior {
            Some(prior) => {
                let cascade_ids: Vec<String> = self
                    .program_enrollment_repository
                    .find_by_category_enrollment(&prior.id)
                    .await?
                    .into_iter()
                    .filter(|e| e.status.is_active())
                    .map(|e| e.id)
                    .collect();
                self.category_enrollment_repository
                    .supersede_and_insert(Some(prior.id), enrollment, cascade_ids)
                    .await
            }
            None => {
                self.category_enrollment_repository
                    .create(enrollment)
                    .await
            }
        }
    }

    async fn build_and_insert(
        &self,
        patient_id: &str,
        program: &Program,
        category_enrollment_id: Option<&str>,
        prior_ids: Vec<String>,
        start_date: NaiveDate,
        enrolled_by: &str,
    ) -> AppResult<ProgramEnrollment> {
        let expected_end = Self::expected_end_date(program, start_date);
        let enrollment = ProgramEnrollment::new(
            patient_id,
            &program.id,
            category_enrollment_id,
            enrolled_by,
            start_date,
            expected_end,
        );

        let modules = self.module_repository.find_by_program(&program.id).await?;
        let seeds: Vec<ModuleProgress> = modules
            .iter()
            .map(|m| ModuleProgress::seed(patient_id, &m.id, &enrollment.id))
            .collect();

        self.program_enrollment_repository
            .supersede_and_insert(prior_ids, enrollment, seeds)
            .await
    }
}
