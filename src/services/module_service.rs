use std::sync::Arc;

use chrono::Utc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::Module,
        dto::request::{CreateModuleRequest, UpdateModuleRequest},
    },
    repositories::{ContentItemRepository, ModuleRepository, ProgramRepository},
    services::sequencer,
};

/// Module authoring within a program: create at the end of the sequence,
/// reorder, delete with the content-item precondition and gap closing.
pub struct ModuleService {
    program_repository: Arc<dyn ProgramRepository>,
    module_repository: Arc<dyn ModuleRepository>,
    content_item_repository: Arc<dyn ContentItemRepository>,
}

impl ModuleService {
    pub fn new(
        program_repository: Arc<dyn ProgramRepository>,
        module_repository: Arc<dyn ModuleRepository>,
        content_item_repository: Arc<dyn ContentItemRepository>,
    ) -> Self {
        Self {
            program_repository,
            module_repository,
            content_item_repository,
        }
    }

    pub async fn create_module(&self, request: CreateModuleRequest) -> AppResult<Module> {
        self.program_repository
            .find_by_id(&request.program_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Program with id '{}' not found",
                    request.program_id
                ))
            })?;

        let siblings = self
            .module_repository
            .find_by_program(&request.program_id)
            .await?;
        let seqs: Vec<i32> = siblings.iter().map(|m| m.sequence_number).collect();

        let module = Module::new(
            &request.program_id,
            &request.title,
            request.description.as_deref(),
            sequencer::next_sequence(&seqs),
            request.estimated_minutes,
            request.is_required,
        );
        self.module_repository.create(module).await
    }

    pub async fn get_module(&self, id: &str) -> AppResult<Module> {
        self.module_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Module with id '{}' not found", id)))
    }

    pub async fn list_modules(&self, program_id: &str) -> AppResult<Vec<Module>> {
        self.module_repository.find_by_program(program_id).await
    }

    /// Metadata update; the sequence number is only ever changed through
    /// `reorder_module`.
    pub async fn update_module(&self, id: &str, request: UpdateModuleRequest) -> AppResult<Module> {
        let mut module = self.get_module(id).await?;
        module.title = request.title;
        module.description = request.description;
        module.estimated_minutes = request.estimated_minutes;
        module.is_required = request.is_required;
        module.modified_at = Some(Utc::now());
        self.module_repository.update(module).await
    }

    /// Moves a module to `new_position` among its program's modules; the
    /// whole shift-then-set plan commits atomically.
    pub async fn reorder_module(&self, module_id: &str, new_position: i32) -> AppResult<()> {
        let module = self.get_module(module_id).await?;
        let siblings: Vec<(String, i32)> = self
            .module_repository
            .find_by_program(&module.program_id)
            .await?
            .into_iter()
            .map(|m| (m.id, m.sequence_number))
            .collect();

        let plan = sequencer::reorder_plan(&siblings, module_id, new_position)?;
        self.module_repository.apply_sequence_updates(plan).await
    }

    /// Deletion is rejected while content items still reference the module;
    /// after a successful delete the remaining siblings are renumbered
    /// unconditionally.
    pub async fn delete_module(&self, module_id: &str) -> AppResult<()> {
        let module = self.get_module(module_id).await?;

        let content_count = self
            .content_item_repository
            .count_by_module(module_id)
            .await?;
        if content_count > 0 {
            return Err(AppError::PreconditionFailed(format!(
                "module '{}' still has {} content item(s); delete them first",
                module_id, content_count
            )));
        }

        self.module_repository.delete(module_id).await?;

        let remaining: Vec<(String, i32)> = self
            .module_repository
            .find_by_program(&module.program_id)
            .await?
            .into_iter()
            .map(|m| (m.id, m.sequence_number))
            .collect();
        let plan = sequencer::close_gap_plan(&remaining);
        self.module_repository.apply_sequence_updates(plan).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::Program;
    use crate::repositories::{
        content_item_repository::MockContentItemRepository, module_repository::MockModuleRepository,
        program_repository::MockProgramRepository,
    };
    use crate::services::sequencer::SequenceUpdate;

    fn module_at(id: &str, seq: i32) -> Module {
        let mut m = Module::new("prog-1", id, None, seq, None, true);
        m.id = id.to_string();
        m
    }

    #[tokio::test]
    async fn create_module_appends_to_sequence() {
        let mut program = MockProgramRepository::new();
        let mut module = MockModuleRepository::new();
        let content = MockContentItemRepository::new();

        program.expect_find_by_id().returning(|id| {
            let mut p = Program::new("cat-1", "Detox-30", None, Some(30), false);
            p.id = id.to_string();
            Ok(Some(p))
        });
        module
            .expect_find_by_program()
            .returning(|_| Ok(vec![module_at("m1", 1), module_at("m2", 2)]));
        module
            .expect_create()
            .withf(|m| m.sequence_number == 3)
            .returning(|m| Ok(m));

        let service =
            ModuleService::new(Arc::new(program), Arc::new(module), Arc::new(content));
        let created = service
            .create_module(CreateModuleRequest {
                program_id: "prog-1".to_string(),
                title: "Aftercare".to_string(),
                description: None,
                estimated_minutes: Some(45),
                is_required: false,
            })
            .await
            .expect("create should succeed");

        assert_eq!(created.sequence_number, 3);
    }

    #[tokio::test]
    async fn delete_module_with_content_is_rejected() {
        let program = MockProgramRepository::new();
        let mut module = MockModuleRepository::new();
        let mut content = MockContentItemRepository::new();

        module
            .expect_find_by_id()
            .returning(|id| Ok(Some(module_at(id, 2))));
        content.expect_count_by_module().returning(|_| Ok(1));
        module.expect_delete().never();

        let service =
            ModuleService::new(Arc::new(program), Arc::new(module), Arc::new(content));
        let err = service.delete_module("m2").await.unwrap_err();

        assert!(matches!(err, AppError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn delete_closes_the_sequence_gap() {
        let program = MockProgramRepository::new();
        let mut module = MockModuleRepository::new();
        let mut content = MockContentItemRepository::new();

        module
            .expect_find_by_id()
            .returning(|id| Ok(Some(module_at(id, 2))));
        content.expect_count_by_module().returning(|_| Ok(0));
        module.expect_delete().times(1).returning(|_| Ok(()));
        // Remaining siblings after deleting seq 2 of 4.
        module.expect_find_by_program().returning(|_| {
            Ok(vec![module_at("m1", 1), module_at("m3", 3), module_at("m4", 4)])
        });
        module
            .expect_apply_sequence_updates()
            .withf(|plan| {
                plan == &[
                    SequenceUpdate {
                        id: "m3".to_string(),
                        sequence_number: 2,
                    },
                    SequenceUpdate {
                        id: "m4".to_string(),
                        sequence_number: 3,
                    },
                ]
            })
            .returning(|_| Ok(()));

        let service =
            ModuleService::new(Arc::new(program), Arc::new(module), Arc::new(content));
        service.delete_module("m2").await.expect("delete should succeed");
    }
}
