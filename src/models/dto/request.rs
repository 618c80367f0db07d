use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::models::domain::{ContentType, EnrollmentStatus, ProgressStatus, QuestionType};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProgramRequest {
    pub category_id: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub duration_days: Option<i64>,

    pub is_self_paced: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateModuleRequest {
    pub program_id: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub estimated_minutes: Option<i32>,

    pub is_required: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateModuleRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub estimated_minutes: Option<i32>,

    pub is_required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetProgramActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContentItemRequest {
    pub module_id: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub content_type: ContentType,

    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAssessmentRequest {
    pub content_item_id: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(range(min = 0, max = 100))]
    pub passing_score: i32,

    #[validate(range(min = 1))]
    pub time_limit_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionOptionInput {
    #[validate(length(min = 1, max = 500))]
    pub option_text: String,

    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,

    pub question_type: QuestionType,

    #[validate(range(min = 1))]
    pub points: i32,

    #[validate(nested)]
    pub options: Vec<QuestionOptionInput>,
}

/// Target position for a sibling reorder. Out-of-range positions are clamped
/// by the sequencer, so no upper bound is validated here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReorderRequest {
    pub new_position: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignCategoryRequest {
    #[validate(length(min = 1))]
    pub patient_id: String,

    pub category_id: String,

    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignProgramRequest {
    #[validate(length(min = 1))]
    pub patient_id: String,

    pub program_id: String,

    pub start_date: NaiveDate,

    #[validate(length(min = 1))]
    pub enrolled_by: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnrollMultipleRequest {
    #[validate(length(min = 1))]
    pub patient_id: String,

    pub category_id: String,

    #[validate(length(min = 1))]
    pub program_ids: Vec<String>,

    pub start_date: Option<NaiveDate>,

    #[validate(length(min = 1))]
    pub enrolled_by: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransitionRequest {
    pub status: EnrollmentStatus,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ModuleStatusRequest {
    #[validate(length(min = 1))]
    pub patient_id: String,

    pub status: ProgressStatus,

    #[validate(range(min = 0))]
    pub time_spent_seconds: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartAttemptRequest {
    #[validate(length(min = 1))]
    pub patient_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerInput {
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub text_response: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(nested)]
    pub answers: Vec<AnswerInput>,
}
