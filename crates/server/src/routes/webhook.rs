use actix_web::{get, post, web, HttpResponse};
use tracing::{info, warn};

use crate::state::AppState;
use crate::types::{StatusResponse, VerifyQuery, VERIFICATION_FAILED};

/// GET /webhook - Subscription verification handshake
#[get("/webhook")]
pub async fn verify_webhook(
    query: web::Query<VerifyQuery>,
    state: web::Data<std::sync::Arc<AppState>>,
) -> actix_web::Result<HttpResponse> {
    let valid = query.is_valid(state.verify_token());

    info!(
        "Verification attempt - mode: {:?}, challenge: {:?}, accepted: {}",
        query.mode, query.challenge, valid
    );

    if !valid {
        warn!("Webhook verification rejected");
        return Ok(HttpResponse::Forbidden()
            .content_type("text/plain; charset=utf-8")
            .body(VERIFICATION_FAILED));
    }

    let challenge = query.into_inner().challenge.unwrap_or_default();
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(challenge))
}

/// POST /webhook - Inbound message notifications, acknowledged unconditionally
#[post("/webhook")]
pub async fn receive_webhook(payload: web::Json<serde_json::Value>) -> actix_web::Result<HttpResponse> {
    info!("Incoming message webhook: {}", payload.0);

    Ok(HttpResponse::Ok().json(StatusResponse::received()))
}
