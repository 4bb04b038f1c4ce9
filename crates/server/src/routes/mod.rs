pub mod system;
pub mod webhook;

use actix_web::web;

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(webhook::verify_webhook)
        .service(webhook::receive_webhook)
        .service(system::health);
}
