use actix_web::{HttpResponse, get, web};
use serde_json::json;

use crate::AppState;
use crate::errors::ApiError;
use crate::services::image_services;

/// GET /static/images/{filename}
/// Serves stored post images; the store sanitizes the name before touching
/// the filesystem.
#[get("/static/images/{filename}")]
pub async fn serve_image(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let filename = path.into_inner();
    let disk_path = state.images.resolve(&filename);

    match std::fs::read(&disk_path) {
        Ok(bytes) => Ok(HttpResponse::Ok()
            .content_type(image_services::content_type_for(&filename))
            .body(bytes)),
        Err(_) => Ok(HttpResponse::NotFound().json(json!({
            "status": "error",
            "message": "image not found",
        }))),
    }
}
