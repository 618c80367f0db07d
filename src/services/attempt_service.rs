use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            Assessment, AssessmentAttempt, Question, QuestionResponse, QuestionType,
            ResponseGrade,
        },
        dto::{
            request::AnswerInput,
            response::{AssessmentView, AttemptResultDto},
        },
    },
    repositories::{AssessmentRepository, AttemptRepository},
};

/// Attempt lifecycle and grading: start, grade per question type, finalize
/// with a percentage score against the assessment's passing threshold.
pub struct AttemptService {
    assessment_repository: Arc<dyn AssessmentRepository>,
    attempt_repository: Arc<dyn AttemptRepository>,
}

impl AttemptService {
    pub fn new(
        assessment_repository: Arc<dyn AssessmentRepository>,
        attempt_repository: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            assessment_repository,
            attempt_repository,
        }
    }

    pub async fn start_attempt(
        &self,
        patient_id: &str,
        assessment_id: &str,
    ) -> AppResult<AssessmentAttempt> {
        self.find_assessment(assessment_id).await?;
        let attempt = AssessmentAttempt::start(patient_id, assessment_id);
        self.attempt_repository.create(attempt).await
    }

    /// A patient's attempt history for one assessment, newest first.
    pub async fn attempt_history(
        &self,
        patient_id: &str,
        assessment_id: &str,
    ) -> AppResult<Vec<AssessmentAttempt>> {
        self.find_assessment(assessment_id).await?;
        self.attempt_repository
            .find_by_patient_and_assessment(patient_id, assessment_id)
            .await
    }

    /// The question set served to a test-taker. Option correctness is
    /// stripped here; the answer key must never reach an open attempt.
    pub async fn assessment_for_taker(&self, assessment_id: &str) -> AppResult<AssessmentView> {
        let assessment = self.find_assessment(assessment_id).await?;
        Ok(AssessmentView::for_taker(&assessment))
    }

    /// Post-grading review projection, answer key included. Only offered for
    /// finalized attempts.
    pub async fn attempt_review(&self, attempt_id: &str) -> AppResult<AssessmentView> {
        let attempt = self.find_attempt(attempt_id).await?;
        if !attempt.is_finalized() {
            return Err(AppError::ValidationError(
                "attempt is still open; review is available after submission".to_string(),
            ));
        }
        let assessment = self.find_assessment(&attempt.assessment_id).await?;
        Ok(AssessmentView::for_review(&assessment))
    }

    /// Grades the submitted answers and finalizes the attempt in one write.
    /// Partial submissions are scored leniently: unanswered questions earn
    /// zero, they do not fail the submission.
    pub async fn submit_attempt(
        &self,
        attempt_id: &str,
        answers: &[AnswerInput],
    ) -> AppResult<AttemptResultDto> {
        let mut attempt = self.find_attempt(attempt_id).await?;
        if attempt.is_finalized() {
            return Err(AppError::ValidationError(format!(
                "attempt '{}' was already submitted; start a new attempt to retake",
                attempt_id
            )));
        }

        let assessment = self.find_assessment(&attempt.assessment_id).await?;

        let mut responses = Vec::new();
        for answer in answers {
            let question = assessment.find_question(&answer.question_id).ok_or_else(|| {
                AppError::NotFound(format!(
                    "Question '{}' not found in assessment '{}'",
                    answer.question_id, assessment.id
                ))
            })?;

            if let Some(response) = Self::grade_answer(question, answer)? {
                responses.push(response);
            }
        }

        attempt.responses = responses;
        let earned = attempt.earned_points();
        let total = assessment.total_possible_points();
        let score = ((100.0 * earned as f64) / total as f64).round() as i32;

        attempt.score = Some(score);
        attempt.passed = Some(score >= assessment.passing_score);
        attempt.completed_at = Some(Utc::now());
        attempt.modified_at = Some(Utc::now());

        let attempt = self.attempt_repository.update(attempt).await?;
        Ok(AttemptResultDto::from_attempt(&attempt, total))
    }

    /// Grades one answer by question type. Choice questions without a
    /// selection are skipped entirely: no response row, no penalty. Free
    /// text is recorded pending review and earns nothing here.
    fn grade_answer(
        question: &Question,
        answer: &AnswerInput,
    ) -> AppResult<Option<QuestionResponse>> {
        match question.question_type {
            QuestionType::TextResponse => Ok(Some(QuestionResponse {
                id: Uuid::new_v4().to_string(),
                question_id: question.id.clone(),
                selected_option_id: None,
                text_response: answer.text_response.clone(),
                grade: ResponseGrade::PendingReview,
                points_earned: 0,
            })),
            QuestionType::MultipleChoice | QuestionType::TrueFalse => {
                let Some(selected) = answer.selected_option_id.as_deref() else {
                    return Ok(None);
                };

                if !question.options.iter().any(|o| o.id == selected) {
                    return Err(AppError::ValidationError(format!(
                        "option '{}' does not belong to question '{}'",
                        selected, question.id
                    )));
                }

                let is_correct = question.correct_option_id() == Some(selected);
                Ok(Some(QuestionResponse {
                    id: Uuid::new_v4().to_string(),
                    question_id: question.id.clone(),
                    selected_option_id: Some(selected.to_string()),
                    text_response: None,
                    grade: if is_correct {
                        ResponseGrade::Correct
                    } else {
                        ResponseGrade::Incorrect
                    },
                    points_earned: if is_correct { question.points } else { 0 },
                }))
            }
        }
    }

    async fn find_assessment(&self, assessment_id: &str) -> AppResult<Assessment> {
        self.assessment_repository
            .find_by_id(assessment_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Assessment with id '{}' not found",
                    assessment_id
                ))
            })
    }

    async fn find_attempt(&self, attempt_id: &str) -> AppResult<AssessmentAttempt> {
        self.attempt_repository
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::QuestionOption;
    use crate::repositories::{
        assessment_repository::MockAssessmentRepository, attempt_repository::MockAttemptRepository,
    };

    fn choice_question(id: &str, points: i32, seq: i32) -> Question {
        Question {
            id: id.to_string(),
            question_text: format!("Question {}", id),
            question_type: QuestionType::MultipleChoice,
            points,
            sequence_number: seq,
            options: vec![
                QuestionOption {
                    id: format!("{}-right", id),
                    option_text: "Right".to_string(),
                    is_correct: true,
                    sequence_number: 1,
                },
                QuestionOption {
                    id: format!("{}-wrong", id),
                    option_text: "Wrong".to_string(),
                    is_correct: false,
                    sequence_number: 2,
                },
            ],
        }
    }

    fn text_question(id: &str, points: i32, seq: i32) -> Question {
        Question {
            id: id.to_string(),
            question_text: "Describe your week".to_string(),
            question_type: QuestionType::TextResponse,
            points,
            sequence_number: seq,
            options: vec![],
        }
    }

    fn answer(question_id: &str, selected: Option<&str>) -> AnswerInput {
        AnswerInput {
            question_id: question_id.to_string(),
            selected_option_id: selected.map(|s| s.to_string()),
            text_response: None,
        }
    }

    fn graded_assessment(passing_score: i32) -> Assessment {
        let mut assessment = Assessment::new("ci-1", "Weekly check", None, passing_score, None);
        assessment.id = "assess-1".to_string();
        assessment.questions = vec![
            choice_question("q1", 5, 1),
            choice_question("q2", 3, 2),
            choice_question("q3", 2, 3),
        ];
        assessment
    }

    fn service_with(
        assessment: Assessment,
        attempt: AssessmentAttempt,
    ) -> AttemptService {
        let mut assessments = MockAssessmentRepository::new();
        let mut attempts = MockAttemptRepository::new();

        assessments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(assessment.clone())));
        attempts
            .expect_find_by_id()
            .returning(move |_| Ok(Some(attempt.clone())));
        attempts.expect_update().returning(|a| Ok(a));

        AttemptService::new(Arc::new(assessments), Arc::new(attempts))
    }

    #[test]
    fn correct_option_earns_full_points() {
        let question = choice_question("q1", 5, 1);
        let response = AttemptService::grade_answer(&question, &answer("q1", Some("q1-right")))
            .expect("grading should succeed")
            .expect("a response row is recorded");

        assert_eq!(response.grade, ResponseGrade::Correct);
        assert_eq!(response.points_earned, 5);
    }

    #[test]
    fn wrong_option_earns_nothing() {
        let question = choice_question("q1", 5, 1);
        let response = AttemptService::grade_answer(&question, &answer("q1", Some("q1-wrong")))
            .expect("grading should succeed")
            .expect("a response row is recorded");

        assert_eq!(response.grade, ResponseGrade::Incorrect);
        assert_eq!(response.points_earned, 0);
    }

    #[test]
    fn missing_selection_is_skipped_not_penalized() {
        let question = choice_question("q1", 5, 1);
        let response = AttemptService::grade_answer(&question, &answer("q1", None))
            .expect("grading should succeed");

        assert!(response.is_none());
    }

    #[test]
    fn foreign_option_is_rejected() {
        let question = choice_question("q1", 5, 1);
        let err = AttemptService::grade_answer(&question, &answer("q1", Some("q9-right")))
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn free_text_is_pending_review_with_zero_points() {
        let question = text_question("q1", 5, 1);
        let input = AnswerInput {
            question_id: "q1".to_string(),
            selected_option_id: None,
            text_response: Some("It went well".to_string()),
        };
        let response = AttemptService::grade_answer(&question, &input)
            .expect("grading should succeed")
            .expect("a response row is recorded");

        assert_eq!(response.grade, ResponseGrade::PendingReview);
        assert_eq!(response.points_earned, 0);
        assert_eq!(response.text_response.as_deref(), Some("It went well"));
    }

    #[tokio::test]
    async fn submit_scores_and_checks_passing_threshold() {
        // Points [5, 3, 2]; earn [5, 0, 2] => 7/10 => 70.
        let assessment = graded_assessment(70);
        let attempt = AssessmentAttempt::start("patient-1", "assess-1");
        let service = service_with(assessment, attempt);

        let result = service
            .submit_attempt(
                "attempt-1",
                &[
                    answer("q1", Some("q1-right")),
                    answer("q2", Some("q2-wrong")),
                    answer("q3", Some("q3-right")),
                ],
            )
            .await
            .expect("submission should succeed");

        assert_eq!(result.earned_points, 7);
        assert_eq!(result.total_possible_points, 10);
        assert_eq!(result.score, Some(70));
        assert_eq!(result.passed, Some(true));
    }

    #[tokio::test]
    async fn partial_submission_scores_unanswered_as_zero() {
        let assessment = graded_assessment(70);
        let attempt = AssessmentAttempt::start("patient-1", "assess-1");
        let service = service_with(assessment, attempt);

        let result = service
            .submit_attempt("attempt-1", &[answer("q1", Some("q1-right"))])
            .await
            .expect("submission should succeed");

        assert_eq!(result.earned_points, 5);
        assert_eq!(result.score, Some(50));
        assert_eq!(result.passed, Some(false));
        assert_eq!(result.responses.len(), 1);
    }

    #[tokio::test]
    async fn resubmitting_a_finalized_attempt_is_rejected() {
        let assessment = graded_assessment(70);
        let mut attempt = AssessmentAttempt::start("patient-1", "assess-1");
        attempt.completed_at = Some(Utc::now());
        let service = service_with(assessment, attempt);

        let err = service
            .submit_attempt("attempt-1", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn empty_assessment_scores_without_dividing_by_zero() {
        let mut assessment = graded_assessment(70);
        assessment.questions.clear();
        let attempt = AssessmentAttempt::start("patient-1", "assess-1");
        let service = service_with(assessment, attempt);

        let result = service
            .submit_attempt("attempt-1", &[])
            .await
            .expect("submission should succeed");

        assert_eq!(result.total_possible_points, 1);
        assert_eq!(result.score, Some(0));
        assert_eq!(result.passed, Some(false));
    }
}
