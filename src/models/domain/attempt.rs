use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grading outcome of one response. Free-text answers are never auto-graded;
/// they stay `PendingReview` so "awaiting a human" is never conflated with
/// "wrong".
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ResponseGrade {
    Correct,
    Incorrect,
    PendingReview,
}

impl ResponseGrade {
    /// The nullable-boolean view the envelope exposes: `None` for responses
    /// still awaiting review.
    pub fn is_correct(&self) -> Option<bool> {
        match self {
            ResponseGrade::Correct => Some(true),
            ResponseGrade::Incorrect => Some(false),
            ResponseGrade::PendingReview => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionResponse {
    pub id: String,
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub text_response: Option<String>,
    pub grade: ResponseGrade,
    pub points_earned: i32,
}

/// One scored submission of an assessment by a patient. Responses are
/// embedded, so grade-then-finalize is a single document write. Attempts are
/// append-only history; a re-take creates a new row.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssessmentAttempt {
    pub id: String,
    pub patient_id: String,
    pub assessment_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: Option<i32>, // percentage, set on finalize
    pub passed: Option<bool>,
    pub responses: Vec<QuestionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl AssessmentAttempt {
    pub fn start(patient_id: &str, assessment_id: &str) -> Self {
        AssessmentAttempt {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            assessment_id: assessment_id.to_string(),
            started_at: Utc::now(),
            completed_at: None,
            score: None,
            passed: None,
            responses: Vec::new(),
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Points over graded responses only; pending-review rows contribute
    /// nothing either way.
    pub fn earned_points(&self) -> i32 {
        self.responses
            .iter()
            .filter(|r| r.grade.is_correct().is_some())
            .map(|r| r.points_earned)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(grade: ResponseGrade, points: i32) -> QuestionResponse {
        QuestionResponse {
            id: Uuid::new_v4().to_string(),
            question_id: Uuid::new_v4().to_string(),
            selected_option_id: None,
            text_response: None,
            grade,
            points_earned: points,
        }
    }

    #[test]
    fn grade_maps_to_nullable_is_correct() {
        assert_eq!(ResponseGrade::Correct.is_correct(), Some(true));
        assert_eq!(ResponseGrade::Incorrect.is_correct(), Some(false));
        assert_eq!(ResponseGrade::PendingReview.is_correct(), None);
    }

    #[test]
    fn earned_points_skips_pending_review() {
        let mut attempt = AssessmentAttempt::start("p-1", "a-1");
        attempt.responses = vec![
            response(ResponseGrade::Correct, 5),
            response(ResponseGrade::Incorrect, 0),
            response(ResponseGrade::PendingReview, 0),
            response(ResponseGrade::Correct, 2),
        ];

        assert_eq!(attempt.earned_points(), 7);
    }

    #[test]
    fn fresh_attempt_is_not_finalized() {
        let attempt = AssessmentAttempt::start("p-1", "a-1");

        assert!(!attempt.is_finalized());
        assert!(attempt.score.is_none());
        assert!(attempt.passed.is_none());
    }

    #[test]
    fn attempt_round_trip_serialization_preserves_grading_fields() {
        let mut attempt = AssessmentAttempt::start("p-1", "a-1");
        attempt.responses = vec![response(ResponseGrade::Correct, 4)];
        attempt.score = Some(80);
        attempt.passed = Some(true);
        attempt.completed_at = Some(Utc::now());

        let json = serde_json::to_string(&attempt).expect("attempt should serialize");
        let parsed: AssessmentAttempt =
            serde_json::from_str(&json).expect("attempt should deserialize");

        assert_eq!(parsed.score, Some(80));
        assert_eq!(parsed.passed, Some(true));
        assert_eq!(parsed.responses.len(), 1);
        assert_eq!(parsed.responses[0].grade, ResponseGrade::Correct);
    }
}
