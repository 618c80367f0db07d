use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{StartAttemptRequest, SubmitAttemptRequest},
        response::ApiResponse,
    },
};

/// Taker-facing question set: the answer key is stripped before this leaves
/// the service layer.
#[get("/api/assessments/{id}/questions")]
async fn get_assessment_for_taker(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let view = state.attempt_service.assessment_for_taker(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(view)))
}

#[get("/api/assessments/{id}/attempts")]
async fn list_attempts(
    state: web::Data<AppState>,
    id: web::Path<String>,
    query: web::Query<StartAttemptRequest>,
) -> Result<HttpResponse, AppError> {
    let attempts = state
        .attempt_service
        .attempt_history(&query.patient_id, &id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempts)))
}

#[post("/api/assessments/{id}/attempts")]
async fn start_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<StartAttemptRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let attempt = state
        .attempt_service
        .start_attempt(&request.patient_id, &id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(attempt)))
}

#[post("/api/attempts/{id}/submit")]
async fn submit_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<SubmitAttemptRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let result = state
        .attempt_service
        .submit_attempt(&id, &request.answers)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(result)))
}

/// Graded review with the answer key, available once the attempt is
/// finalized.
#[get("/api/attempts/{id}/review")]
async fn attempt_review(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let view = state.attempt_service.attempt_review(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(view)))
}
