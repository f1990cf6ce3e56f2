//! Serves stored images from the media root.

use actix_web::{HttpResponse, web};

use kittygram_core::ports::MediaStore;

use crate::middleware::error::AppResult;
use crate::state::AppState;

fn content_type_for(path: &str) -> &'static str {
    if path.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// GET /media/{path} - public
pub async fn serve(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let path = path.into_inner();
    let bytes = state.media.load(&path).await?;

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&path))
        .body(bytes))
}
