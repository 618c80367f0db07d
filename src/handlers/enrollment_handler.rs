use actix_web::{post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{
            AssignCategoryRequest, AssignProgramRequest, EnrollMultipleRequest,
            ModuleStatusRequest, TransitionRequest,
        },
        response::ApiResponse,
    },
};

#[post("/api/enrollments/category")]
async fn assign_category(
    state: web::Data<AppState>,
    request: web::Json<AssignCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let enrollment = state
        .enrollment_service
        .assign_category(&request.patient_id, &request.category_id, request.start_date)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(enrollment)))
}

#[post("/api/enrollments/program")]
async fn assign_program(
    state: web::Data<AppState>,
    request: web::Json<AssignProgramRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let enrollment = state
        .enrollment_service
        .assign_program(
            &request.patient_id,
            &request.program_id,
            request.start_date,
            &request.enrolled_by,
        )
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(enrollment)))
}

#[post("/api/enrollments/batch")]
async fn enroll_multiple(
    state: web::Data<AppState>,
    request: web::Json<EnrollMultipleRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let outcome = state.enrollment_service.enroll_multiple(request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(outcome)))
}

#[put("/api/enrollments/program/{id}/status")]
async fn transition_program_enrollment(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
    let enrollment = state
        .enrollment_service
        .transition_program(&id, request.status)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(enrollment)))
}

#[put("/api/enrollments/category/{id}/status")]
async fn transition_category_enrollment(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
    let enrollment = state
        .enrollment_service
        .transition_category(&id, request.status)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(enrollment)))
}

#[put("/api/modules/{id}/progress")]
async fn set_module_status(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<ModuleStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let update = state
        .progress_service
        .set_module_status(
            &request.patient_id,
            &id,
            request.status,
            request.time_spent_seconds,
        )
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({
        "progress": update.progress,
        "enrollment_completed": update.enrollment_completed,
    }))))
}
