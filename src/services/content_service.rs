use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            Assessment, ContentItem, ContentType, Question, QuestionOption, QuestionType,
        },
        dto::request::{AddQuestionRequest, CreateAssessmentRequest, CreateContentItemRequest},
    },
    repositories::{AssessmentRepository, ContentItemRepository, ModuleRepository},
    services::sequencer,
};

/// Content item authoring within a module, plus assessment and question
/// authoring. Questions are embedded in their assessment, so question
/// sequence plans are applied in memory and committed with one write.
pub struct ContentService {
    module_repository: Arc<dyn ModuleRepository>,
    content_item_repository: Arc<dyn ContentItemRepository>,
    assessment_repository: Arc<dyn AssessmentRepository>,
}

impl ContentService {
    pub fn new(
        module_repository: Arc<dyn ModuleRepository>,
        content_item_repository: Arc<dyn ContentItemRepository>,
        assessment_repository: Arc<dyn AssessmentRepository>,
    ) -> Self {
        Self {
            module_repository,
            content_item_repository,
            assessment_repository,
        }
    }

    pub async fn create_content_item(
        &self,
        request: CreateContentItemRequest,
    ) -> AppResult<ContentItem> {
        self.module_repository
            .find_by_id(&request.module_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Module with id '{}' not found", request.module_id))
            })?;

        let siblings = self
            .content_item_repository
            .find_by_module(&request.module_id)
            .await?;
        let seqs: Vec<i32> = siblings.iter().map(|c| c.sequence_number).collect();

        let item = ContentItem::new(
            &request.module_id,
            &request.title,
            request.content_type,
            request.content.as_deref(),
            sequencer::next_sequence(&seqs),
        );
        self.content_item_repository.create(item).await
    }

    pub async fn list_content_items(&self, module_id: &str) -> AppResult<Vec<ContentItem>> {
        self.content_item_repository.find_by_module(module_id).await
    }

    pub async fn reorder_content_item(
        &self,
        content_item_id: &str,
        new_position: i32,
    ) -> AppResult<()> {
        let item = self.get_content_item(content_item_id).await?;
        let siblings: Vec<(String, i32)> = self
            .content_item_repository
            .find_by_module(&item.module_id)
            .await?
            .into_iter()
            .map(|c| (c.id, c.sequence_number))
            .collect();

        let plan = sequencer::reorder_plan(&siblings, content_item_id, new_position)?;
        self.content_item_repository
            .apply_sequence_updates(plan)
            .await
    }

    /// An assessment-typed item with a live assessment attached cannot be
    /// deleted; remaining siblings are renumbered after a successful delete.
    pub async fn delete_content_item(&self, content_item_id: &str) -> AppResult<()> {
        let item = self.get_content_item(content_item_id).await?;

        if item.content_type == ContentType::Assessment {
            if let Some(assessment) = self
                .assessment_repository
                .find_by_content_item(content_item_id)
                .await?
            {
                return Err(AppError::PreconditionFailed(format!(
                    "content item '{}' still has assessment '{}' attached; delete it first",
                    content_item_id, assessment.id
                )));
            }
        }

        self.content_item_repository.delete(content_item_id).await?;

        let remaining: Vec<(String, i32)> = self
            .content_item_repository
            .find_by_module(&item.module_id)
            .await?
            .into_iter()
            .map(|c| (c.id, c.sequence_number))
            .collect();
        let plan = sequencer::close_gap_plan(&remaining);
        self.content_item_repository
            .apply_sequence_updates(plan)
            .await
    }

    /// Attaches an assessment to an `assessment`-typed content item. The
    /// relationship is 1:1.
    pub async fn create_assessment(
        &self,
        request: CreateAssessmentRequest,
    ) -> AppResult<Assessment> {
        let item = self.get_content_item(&request.content_item_id).await?;
        if item.content_type != ContentType::Assessment {
            return Err(AppError::ValidationError(format!(
                "content item '{}' is not assessment-typed",
                request.content_item_id
            )));
        }

        if self
            .assessment_repository
            .find_by_content_item(&request.content_item_id)
            .await?
            .is_some()
        {
            return Err(AppError::ValidationError(format!(
                "content item '{}' already has an assessment",
                request.content_item_id
            )));
        }

        let assessment = Assessment::new(
            &request.content_item_id,
            &request.title,
            request.description.as_deref(),
            request.passing_score,
            request.time_limit_minutes,
        );
        self.assessment_repository.create(assessment).await
    }

    /// Detaches and deletes an assessment, clearing the way for its content
    /// item to be deleted. Past attempts keep their copy of the scoring.
    pub async fn delete_assessment(&self, assessment_id: &str) -> AppResult<()> {
        self.get_assessment(assessment_id).await?;
        self.assessment_repository.delete(assessment_id).await
    }

    pub async fn add_question(
        &self,
        assessment_id: &str,
        request: AddQuestionRequest,
    ) -> AppResult<Assessment> {
        Self::check_option_invariants(&request)?;

        let mut assessment = self.get_assessment(assessment_id).await?;

        let seqs: Vec<i32> = assessment
            .questions
            .iter()
            .map(|q| q.sequence_number)
            .collect();

        let options = request
            .options
            .iter()
            .enumerate()
            .map(|(index, opt)| QuestionOption {
                id: Uuid::new_v4().to_string(),
                option_text: opt.option_text.clone(),
                is_correct: opt.is_correct,
                sequence_number: index as i32 + 1,
            })
            .collect();

        assessment.questions.push(Question {
            id: Uuid::new_v4().to_string(),
            question_text: request.question_text,
            question_type: request.question_type,
            points: request.points,
            sequence_number: sequencer::next_sequence(&seqs),
            options,
        });
        assessment.modified_at = Some(Utc::now());

        self.assessment_repository.update(assessment).await
    }

    pub async fn reorder_question(
        &self,
        assessment_id: &str,
        question_id: &str,
        new_position: i32,
    ) -> AppResult<Assessment> {
        let mut assessment = self.get_assessment(assessment_id).await?;

        let siblings: Vec<(String, i32)> = assessment
            .questions
            .iter()
            .map(|q| (q.id.clone(), q.sequence_number))
            .collect();
        let plan = sequencer::reorder_plan(&siblings, question_id, new_position)?;

        for update in plan {
            if let Some(question) = assessment
                .questions
                .iter_mut()
                .find(|q| q.id == update.id)
            {
                question.sequence_number = update.sequence_number;
            }
        }
        assessment
            .questions
            .sort_by_key(|q| q.sequence_number);
        assessment.modified_at = Some(Utc::now());

        self.assessment_repository.update(assessment).await
    }

    pub async fn remove_question(
        &self,
        assessment_id: &str,
        question_id: &str,
    ) -> AppResult<Assessment> {
        let mut assessment = self.get_assessment(assessment_id).await?;

        let before = assessment.questions.len();
        assessment.questions.retain(|q| q.id != question_id);
        if assessment.questions.len() == before {
            return Err(AppError::NotFound(format!(
                "Question '{}' not found in assessment '{}'",
                question_id, assessment_id
            )));
        }

        let siblings: Vec<(String, i32)> = assessment
            .questions
            .iter()
            .map(|q| (q.id.clone(), q.sequence_number))
            .collect();
        for update in sequencer::close_gap_plan(&siblings) {
            if let Some(question) = assessment
                .questions
                .iter_mut()
                .find(|q| q.id == update.id)
            {
                question.sequence_number = update.sequence_number;
            }
        }
        assessment.modified_at = Some(Utc::now());

        self.assessment_repository.update(assessment).await
    }

    fn check_option_invariants(request: &AddQuestionRequest) -> AppResult<()> {
        match request.question_type {
            QuestionType::TextResponse => {
                if !request.options.is_empty() {
                    return Err(AppError::ValidationError(
                        "free-text questions take no options".to_string(),
                    ));
                }
            }
            QuestionType::TrueFalse => {
                if request.options.len() != 2 {
                    return Err(AppError::ValidationError(
                        "true/false questions require exactly two options".to_string(),
                    ));
                }
                if !request.options.iter().any(|o| o.is_correct) {
                    return Err(AppError::ValidationError(
                        "at least one option must be flagged correct".to_string(),
                    ));
                }
            }
            QuestionType::MultipleChoice => {
                if request.options.len() < 2 {
                    return Err(AppError::ValidationError(
                        "choice questions require at least two options".to_string(),
                    ));
                }
                if !request.options.iter().any(|o| o.is_correct) {
                    return Err(AppError::ValidationError(
                        "at least one option must be flagged correct".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    async fn get_content_item(&self, id: &str) -> AppResult<ContentItem> {
        self.content_item_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Content item with id '{}' not found", id)))
    }

    async fn get_assessment(&self, id: &str) -> AppResult<Assessment> {
        self.assessment_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assessment with id '{}' not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dto::request::QuestionOptionInput;
    use crate::repositories::{
        assessment_repository::MockAssessmentRepository,
        content_item_repository::MockContentItemRepository, module_repository::MockModuleRepository,
    };

    fn option_input(text: &str, is_correct: bool) -> QuestionOptionInput {
        QuestionOptionInput {
            option_text: text.to_string(),
            is_correct,
        }
    }

    fn service_with_assessment(assessment: Assessment) -> ContentService {
        let module = MockModuleRepository::new();
        let content = MockContentItemRepository::new();
        let mut assessments = MockAssessmentRepository::new();

        assessments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(assessment.clone())));
        assessments.expect_update().returning(|a| Ok(a));

        ContentService::new(Arc::new(module), Arc::new(content), Arc::new(assessments))
    }

    fn question_at(id: &str, seq: i32) -> Question {
        Question {
            id: id.to_string(),
            question_text: format!("Question {}", id),
            question_type: QuestionType::TrueFalse,
            points: 1,
            sequence_number: seq,
            options: vec![],
        }
    }

    #[tokio::test]
    async fn true_false_requires_exactly_two_options() {
        let service = service_with_assessment(Assessment::new("ci-1", "Check", None, 70, None));

        let err = service
            .add_question(
                "assess-1",
                AddQuestionRequest {
                    question_text: "Is water wet?".to_string(),
                    question_type: QuestionType::TrueFalse,
                    points: 1,
                    options: vec![option_input("True", true)],
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn choice_question_requires_a_correct_option() {
        let service = service_with_assessment(Assessment::new("ci-1", "Check", None, 70, None));

        let err = service
            .add_question(
                "assess-1",
                AddQuestionRequest {
                    question_text: "Pick one".to_string(),
                    question_type: QuestionType::MultipleChoice,
                    points: 2,
                    options: vec![option_input("A", false), option_input("B", false)],
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn added_question_lands_at_the_end_of_the_sequence() {
        let mut assessment = Assessment::new("ci-1", "Check", None, 70, None);
        assessment.questions = vec![question_at("q1", 1), question_at("q2", 2)];
        let service = service_with_assessment(assessment);

        let updated = service
            .add_question(
                "assess-1",
                AddQuestionRequest {
                    question_text: "Is water wet?".to_string(),
                    question_type: QuestionType::TrueFalse,
                    points: 1,
                    options: vec![option_input("True", true), option_input("False", false)],
                },
            )
            .await
            .expect("add should succeed");

        assert_eq!(updated.questions.len(), 3);
        assert_eq!(updated.questions[2].sequence_number, 3);
    }

    #[tokio::test]
    async fn removing_a_question_closes_the_gap() {
        let mut assessment = Assessment::new("ci-1", "Check", None, 70, None);
        assessment.questions = vec![
            question_at("q1", 1),
            question_at("q2", 2),
            question_at("q3", 3),
        ];
        let service = service_with_assessment(assessment);

        let updated = service
            .remove_question("assess-1", "q2")
            .await
            .expect("remove should succeed");

        let seqs: Vec<(String, i32)> = updated
            .questions
            .iter()
            .map(|q| (q.id.clone(), q.sequence_number))
            .collect();
        assert_eq!(
            seqs,
            vec![("q1".to_string(), 1), ("q3".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn reorder_question_moves_and_renumbers() {
        let mut assessment = Assessment::new("ci-1", "Check", None, 70, None);
        assessment.questions = vec![
            question_at("q1", 1),
            question_at("q2", 2),
            question_at("q3", 3),
        ];
        let service = service_with_assessment(assessment);

        let updated = service
            .reorder_question("assess-1", "q3", 1)
            .await
            .expect("reorder should succeed");

        let order: Vec<&str> = updated.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(order, vec!["q3", "q1", "q2"]);
    }
}
