use actix_web::{delete, get, post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{CreateModuleRequest, ReorderRequest, UpdateModuleRequest},
        response::ApiResponse,
    },
};

#[post("/api/modules")]
async fn create_module(
    state: web::Data<AppState>,
    request: web::Json<CreateModuleRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let module = state.module_service.create_module(request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(module)))
}

#[get("/api/programs/{id}/modules")]
async fn list_modules(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let modules = state.module_service.list_modules(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(modules)))
}

#[put("/api/modules/{id}")]
async fn update_module(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateModuleRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;
    let module = state.module_service.update_module(&id, request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(module)))
}

#[put("/api/modules/{id}/position")]
async fn reorder_module(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<ReorderRequest>,
) -> Result<HttpResponse, AppError> {
    state
        .module_service
        .reorder_module(&id, request.new_position)
        .await?;
    let module = state.module_service.get_module(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(module)))
}

#[delete("/api/modules/{id}")]
async fn delete_module(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.module_service.delete_module(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({ "deleted": *id }))))
}
