use crate::models::domain::{
    Assessment, Category, Module, Program, Question, QuestionOption, QuestionType,
};

#[cfg(test)]
pub mod fixtures {
    use super::*;
    use uuid::Uuid;

    /// Creates a standard test category
    pub fn test_category() -> Category {
        Category::new("Substance Recovery", Some("Recovery track"))
    }

    /// Creates an active 30-day program under the given category
    pub fn test_program(category_id: &str) -> Program {
        Program::new(category_id, "Detox 30", Some("30-day detox"), Some(30), false)
    }

    /// Creates a self-paced program with no fixed duration
    pub fn test_self_paced_program(category_id: &str) -> Program {
        Program::new(category_id, "Aftercare", None, None, true)
    }

    /// Creates a required module at the given position
    pub fn test_module(program_id: &str, title: &str, sequence_number: i32) -> Module {
        Module::new(program_id, title, None, sequence_number, Some(45), true)
    }

    /// Creates an optional module at the given position
    pub fn test_optional_module(program_id: &str, title: &str, sequence_number: i32) -> Module {
        Module::new(program_id, title, None, sequence_number, None, false)
    }

    pub fn test_option(text: &str, is_correct: bool, sequence_number: i32) -> QuestionOption {
        QuestionOption {
            id: Uuid::new_v4().to_string(),
            option_text: text.to_string(),
            is_correct,
            sequence_number,
        }
    }

    /// Creates a two-option true/false question worth `points`
    pub fn test_true_false_question(points: i32, sequence_number: i32) -> Question {
        Question {
            id: Uuid::new_v4().to_string(),
            question_text: "Cravings pass with time".to_string(),
            question_type: QuestionType::TrueFalse,
            points,
            sequence_number,
            options: vec![test_option("True", true, 1), test_option("False", false, 2)],
        }
    }

    /// Creates an assessment with a 70% passing score and no questions
    pub fn test_assessment(content_item_id: &str) -> Assessment {
        Assessment::new(content_item_id, "Module check", None, 70, None)
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_test_program() {
        let category = test_category();
        let program = test_program(&category.id);

        assert_eq!(program.category_id, category.id);
        assert_eq!(program.duration_days, Some(30));
        assert!(program.is_active);
        assert!(!program.is_self_paced);
    }

    #[test]
    fn test_fixtures_test_true_false_question() {
        let question = test_true_false_question(5, 1);

        assert_eq!(question.options.len(), 2);
        assert!(question.correct_option_id().is_some());
    }
}
