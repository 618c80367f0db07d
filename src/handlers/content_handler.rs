use actix_web::{delete, get, post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{
            AddQuestionRequest, CreateAssessmentRequest, CreateContentItemRequest, ReorderRequest,
        },
        response::ApiResponse,
    },
};

#[post("/api/content-items")]
async fn create_content_item(
    state: web::Data<AppState>,
    request: web::Json<CreateContentItemRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let item = state.content_service.create_content_item(request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(item)))
}

#[get("/api/modules/{id}/content-items")]
async fn list_content_items(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let items = state.content_service.list_content_items(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(items)))
}

#[put("/api/content-items/{id}/position")]
async fn reorder_content_item(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<ReorderRequest>,
) -> Result<HttpResponse, AppError> {
    state
        .content_service
        .reorder_content_item(&id, request.new_position)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "reordered": *id }))))
}

#[delete("/api/content-items/{id}")]
async fn delete_content_item(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.content_service.delete_content_item(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "deleted": *id }))))
}

#[post("/api/assessments")]
async fn create_assessment(
    state: web::Data<AppState>,
    request: web::Json<CreateAssessmentRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let assessment = state.content_service.create_assessment(request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(assessment)))
}

#[delete("/api/assessments/{id}")]
async fn delete_assessment(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.content_service.delete_assessment(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "deleted": *id }))))
}

#[post("/api/assessments/{id}/questions")]
async fn add_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<AddQuestionRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let assessment = state.content_service.add_question(&id, request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(assessment)))
}

#[put("/api/assessments/{assessment_id}/questions/{question_id}/position")]
async fn reorder_question(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<ReorderRequest>,
) -> Result<HttpResponse, AppError> {
    let (assessment_id, question_id) = path.into_inner();
    let assessment = state
        .content_service
        .reorder_question(&assessment_id, &question_id, request.new_position)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(assessment)))
}

#[delete("/api/assessments/{assessment_id}/questions/{question_id}")]
async fn remove_question(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (assessment_id, question_id) = path.into_inner();
    let assessment = state
        .content_service
        .remove_question(&assessment_id, &question_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(assessment)))
}
