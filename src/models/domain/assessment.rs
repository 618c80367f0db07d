use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scored test attached 1:1 to an `assessment`-typed content item.
///
/// Questions (and their options) are embedded: the assessment owns them
/// outright, and a question reorder becomes a single document write.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Assessment {
    pub id: String,
    pub content_item_id: String,
    pub title: String,
    pub description: Option<String>,
    pub passing_score: i32, // percentage 0-100
    pub time_limit_minutes: Option<i64>,
    pub questions: Vec<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub points: i32,
    pub sequence_number: i32,
    pub options: Vec<QuestionOption>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionOption {
    pub id: String,
    pub option_text: String,
    pub is_correct: bool,
    pub sequence_number: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    TextResponse,
}

impl Assessment {
    pub fn new(
        content_item_id: &str,
        title: &str,
        description: Option<&str>,
        passing_score: i32,
        time_limit_minutes: Option<i64>,
    ) -> Self {
        Assessment {
            id: Uuid::new_v4().to_string(),
            content_item_id: content_item_id.to_string(),
            title: title.to_string(),
            description: description.map(|d| d.to_string()),
            passing_score,
            time_limit_minutes,
            questions: Vec::new(),
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    pub fn find_question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Sum of all question point values, floored at 1 so a score can always
    /// be computed as a percentage.
    pub fn total_possible_points(&self) -> i32 {
        self.questions.iter().map(|q| q.points).sum::<i32>().max(1)
    }
}

impl Question {
    pub fn correct_option_id(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.is_correct)
            .map(|o| o.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, is_correct: bool, seq: i32) -> QuestionOption {
        QuestionOption {
            id: Uuid::new_v4().to_string(),
            option_text: text.to_string(),
            is_correct,
            sequence_number: seq,
        }
    }

    #[test]
    fn question_type_round_trip_serialization() {
        let variants = [
            QuestionType::MultipleChoice,
            QuestionType::TrueFalse,
            QuestionType::TextResponse,
        ];

        for variant in variants {
            let json = serde_json::to_string(&variant).expect("variant should serialize");
            let parsed: QuestionType =
                serde_json::from_str(&json).expect("variant should deserialize");
            assert_eq!(variant, parsed);
        }

        assert_eq!(
            serde_json::to_string(&QuestionType::MultipleChoice).unwrap(),
            "\"multiple_choice\""
        );
    }

    #[test]
    fn question_type_rejects_unknown_variant() {
        assert!(serde_json::from_str::<QuestionType>("\"essay\"").is_err());
    }

    #[test]
    fn correct_option_id_finds_flagged_option() {
        let correct = option("True", true, 1);
        let correct_id = correct.id.clone();
        let question = Question {
            id: "q-1".to_string(),
            question_text: "Is water wet?".to_string(),
            question_type: QuestionType::TrueFalse,
            points: 2,
            sequence_number: 1,
            options: vec![correct, option("False", false, 2)],
        };

        assert_eq!(question.correct_option_id(), Some(correct_id.as_str()));
    }

    #[test]
    fn total_possible_points_floors_at_one() {
        let mut assessment = Assessment::new("ci-1", "Empty", None, 70, None);
        assert_eq!(assessment.total_possible_points(), 1);

        assessment.questions.push(Question {
            id: "q-1".to_string(),
            question_text: "Free text".to_string(),
            question_type: QuestionType::TextResponse,
            points: 5,
            sequence_number: 1,
            options: vec![],
        });
        assert_eq!(assessment.total_possible_points(), 5);
    }
}
