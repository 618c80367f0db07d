use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Request-body validation failures keep the per-field error map so the
    /// envelope can surface which fields were rejected.
    #[error("Validation error: {message}")]
    FieldValidation {
        message: String,
        fields: serde_json::Value,
    },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Failure half of the uniform envelope: `{ "success": false, "error": { .. } }`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::FieldValidation { .. } => StatusCode::BAD_REQUEST,
            AppError::PreconditionFailed(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TransactionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            AppError::FieldValidation { fields, .. } => Some(fields.clone()),
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            error: ErrorBody {
                message: self.to_string(),
                details,
            },
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::InternalError(format!("BSON serialization error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields = serde_json::to_value(&err)
            .unwrap_or_else(|_| serde_json::Value::String(err.to_string()));
        AppError::FieldValidation {
            message: err.to_string(),
            fields,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ValidationError("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PreconditionFailed("test".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::TransactionError("test".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validator_errors_keep_field_details() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("title", validator::ValidationError::new("length"));

        let err = AppError::from(errors);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        match err {
            AppError::FieldValidation { fields, .. } => {
                assert!(fields.get("title").is_some());
            }
            other => panic!("expected field validation, got {:?}", other),
        }
    }

    #[test]
    fn test_error_messages() {
        let err = AppError::NotFound("module".into());
        assert_eq!(err.to_string(), "Not found: module");

        let err = AppError::PreconditionFailed("module has content items".into());
        assert_eq!(
            err.to_string(),
            "Precondition failed: module has content items"
        );
    }
}
