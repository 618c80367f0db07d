pub mod attempt_handler;
pub mod catalog_handler;
pub mod content_handler;
pub mod enrollment_handler;
pub mod module_handler;

use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, errors::AppError, models::dto::response::ApiResponse};

#[get("/health")]
async fn health(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state.db.health_check().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({
        "status": "ok",
        "database": state.db.db_name(),
    }))))
}

/// Registers every API route on the server. Authentication and role checks
/// happen upstream of this layer.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(catalog_handler::create_category)
        .service(catalog_handler::list_categories)
        .service(catalog_handler::rename_category)
        .service(catalog_handler::create_program)
        .service(catalog_handler::get_program)
        .service(catalog_handler::list_programs)
        .service(catalog_handler::set_program_active)
        .service(catalog_handler::delete_program)
        .service(module_handler::create_module)
        .service(module_handler::list_modules)
        .service(module_handler::update_module)
        .service(module_handler::reorder_module)
        .service(module_handler::delete_module)
        .service(content_handler::create_content_item)
        .service(content_handler::list_content_items)
        .service(content_handler::reorder_content_item)
        .service(content_handler::delete_content_item)
        .service(content_handler::create_assessment)
        .service(content_handler::delete_assessment)
        .service(content_handler::add_question)
        .service(content_handler::reorder_question)
        .service(content_handler::remove_question)
        .service(enrollment_handler::assign_category)
        .service(enrollment_handler::assign_program)
        .service(enrollment_handler::enroll_multiple)
        .service(enrollment_handler::transition_program_enrollment)
        .service(enrollment_handler::transition_category_enrollment)
        .service(enrollment_handler::set_module_status)
        .service(attempt_handler::get_assessment_for_taker)
        .service(attempt_handler::list_attempts)
        .service(attempt_handler::start_attempt)
        .service(attempt_handler::submit_attempt)
        .service(attempt_handler::attempt_review);
}
