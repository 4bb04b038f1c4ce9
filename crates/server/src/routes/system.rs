use actix_web::{get, HttpResponse};

use crate::types::StatusResponse;

/// Liveness probe
#[get("/health")]
pub async fn health() -> actix_web::Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}
