use actix_web::{delete, get, post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{CreateCategoryRequest, CreateProgramRequest, SetProgramActiveRequest},
        response::ApiResponse,
    },
};

#[post("/api/categories")]
async fn create_category(
    state: web::Data<AppState>,
    request: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let category = state.program_service.create_category(request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(category)))
}

#[get("/api/categories")]
async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = state.program_service.list_categories().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(categories)))
}

#[put("/api/categories/{id}")]
async fn rename_category(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let category = state
        .program_service
        .rename_category(&id, &request.name)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(category)))
}

#[post("/api/programs")]
async fn create_program(
    state: web::Data<AppState>,
    request: web::Json<CreateProgramRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let program = state.program_service.create_program(request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(program)))
}

#[get("/api/programs/{id}")]
async fn get_program(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let program = state.program_service.get_program(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(program)))
}

#[get("/api/categories/{id}/programs")]
async fn list_programs(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let programs = state.program_service.list_programs(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(programs)))
}

#[put("/api/programs/{id}/active")]
async fn set_program_active(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<SetProgramActiveRequest>,
) -> Result<HttpResponse, AppError> {
    let program = state
        .program_service
        .set_program_active(&id, request.is_active)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(program)))
}

#[delete("/api/programs/{id}")]
async fn delete_program(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.program_service.delete_program(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "deleted": *id }))))
}
