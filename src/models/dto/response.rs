use serde::Serialize;

use crate::models::domain::{Assessment, AssessmentAttempt, QuestionType};

/// Success half of the uniform envelope: `{ "success": true, "data": .. }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data,
        }
    }
}

/// Batch enrollment outcome. Partial success is not an error: callers compare
/// `enrolled_count` against `requested_count`.
#[derive(Debug, Serialize)]
pub struct EnrollMultipleResponse {
    pub category_enrollment_id: String,
    pub requested_count: usize,
    pub enrolled_count: usize,
    pub enrollment_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct OptionView {
    pub id: String,
    pub option_text: String,
    pub sequence_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub points: i32,
    pub sequence_number: i32,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Serialize)]
pub struct AssessmentView {
    pub id: String,
    pub content_item_id: String,
    pub title: String,
    pub description: Option<String>,
    pub passing_score: i32,
    pub time_limit_minutes: Option<i64>,
    pub questions: Vec<QuestionView>,
}

impl AssessmentView {
    /// Projection served to a test-taker: option correctness is stripped so
    /// the answer key never reaches an in-progress attempt.
    pub fn for_taker(assessment: &Assessment) -> Self {
        Self::project(assessment, false)
    }

    /// Post-grading review projection; correctness flags included.
    pub fn for_review(assessment: &Assessment) -> Self {
        Self::project(assessment, true)
    }

    fn project(assessment: &Assessment, reveal_answers: bool) -> Self {
        AssessmentView {
            id: assessment.id.clone(),
            content_item_id: assessment.content_item_id.clone(),
            title: assessment.title.clone(),
            description: assessment.description.clone(),
            passing_score: assessment.passing_score,
            time_limit_minutes: assessment.time_limit_minutes,
            questions: assessment
                .questions
                .iter()
                .map(|q| QuestionView {
                    id: q.id.clone(),
                    question_text: q.question_text.clone(),
                    question_type: q.question_type,
                    points: q.points,
                    sequence_number: q.sequence_number,
                    options: q
                        .options
                        .iter()
                        .map(|o| OptionView {
                            id: o.id.clone(),
                            option_text: o.option_text.clone(),
                            sequence_number: o.sequence_number,
                            is_correct: reveal_answers.then_some(o.is_correct),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseDto {
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub is_correct: Option<bool>,
    pub points_earned: i32,
}

#[derive(Debug, Serialize)]
pub struct AttemptResultDto {
    pub attempt_id: String,
    pub assessment_id: String,
    pub score: Option<i32>,
    pub passed: Option<bool>,
    pub earned_points: i32,
    pub total_possible_points: i32,
    pub responses: Vec<ResponseDto>,
}

impl AttemptResultDto {
    pub fn from_attempt(attempt: &AssessmentAttempt, total_possible_points: i32) -> Self {
        AttemptResultDto {
            attempt_id: attempt.id.clone(),
            assessment_id: attempt.assessment_id.clone(),
            score: attempt.score,
            passed: attempt.passed,
            earned_points: attempt.earned_points(),
            total_possible_points,
            responses: attempt
                .responses
                .iter()
                .map(|r| ResponseDto {
                    question_id: r.question_id.clone(),
                    selected_option_id: r.selected_option_id.clone(),
                    is_correct: r.grade.is_correct(),
                    points_earned: r.points_earned,
                })
                .collect(),
        }
    }
}
