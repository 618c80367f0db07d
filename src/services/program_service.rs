use std::sync::Arc;

use chrono::Utc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Category, Program},
        dto::request::{CreateCategoryRequest, CreateProgramRequest},
    },
    repositories::{CategoryRepository, ModuleRepository, ProgramRepository},
};

/// Category and program authoring. Thin CRUD, except for the delete
/// precondition: a program with modules cannot be removed.
pub struct ProgramService {
    category_repository: Arc<dyn CategoryRepository>,
    program_repository: Arc<dyn ProgramRepository>,
    module_repository: Arc<dyn ModuleRepository>,
}

impl ProgramService {
    pub fn new(
        category_repository: Arc<dyn CategoryRepository>,
        program_repository: Arc<dyn ProgramRepository>,
        module_repository: Arc<dyn ModuleRepository>,
    ) -> Self {
        Self {
            category_repository,
            program_repository,
            module_repository,
        }
    }

    pub async fn create_category(&self, request: CreateCategoryRequest) -> AppResult<Category> {
        let category = Category::new(&request.name, request.description.as_deref());
        self.category_repository.create(category).await
    }

    pub async fn rename_category(&self, id: &str, name: &str) -> AppResult<Category> {
        let mut category = self
            .category_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id '{}' not found", id)))?;

        category.name = name.to_string();
        category.modified_at = Some(Utc::now());
        self.category_repository.update(category).await
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.category_repository.list().await
    }

    pub async fn create_program(&self, request: CreateProgramRequest) -> AppResult<Program> {
        self.category_repository
            .find_by_id(&request.category_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Category with id '{}' not found",
                    request.category_id
                ))
            })?;

        let program = Program::new(
            &request.category_id,
            &request.title,
            request.description.as_deref(),
            request.duration_days,
            request.is_self_paced,
        );
        self.program_repository.create(program).await
    }

    pub async fn get_program(&self, id: &str) -> AppResult<Program> {
        self.program_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Program with id '{}' not found", id)))
    }

    pub async fn list_programs(&self, category_id: &str) -> AppResult<Vec<Program>> {
        self.program_repository.find_by_category(category_id).await
    }

    pub async fn set_program_active(&self, id: &str, is_active: bool) -> AppResult<Program> {
        let mut program = self.get_program(id).await?;
        program.is_active = is_active;
        program.modified_at = Some(Utc::now());
        self.program_repository.update(program).await
    }

    /// Rejected before any mutation when modules still reference the
    /// program.
    pub async fn delete_program(&self, id: &str) -> AppResult<()> {
        self.get_program(id).await?;

        let module_count = self.module_repository.count_by_program(id).await?;
        if module_count > 0 {
            return Err(AppError::PreconditionFailed(format!(
                "program '{}' still has {} module(s); delete them first",
                id, module_count
            )));
        }

        self.program_repository.delete(id).await
    }
}
