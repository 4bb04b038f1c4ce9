//! Chatdigest webhook server
//!
//! Actix-web server for the messaging platform webhook: subscription
//! verification and inbound notification acknowledgment

pub mod routes;
pub mod state;
pub mod types;

use actix_web::{web, App, HttpServer};
use chatdigest_common::{AppConfig, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::state::AppState;

/// Start the webhook server and run until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_addr = config.server_bind_address();
    let state = web::Data::new(Arc::new(AppState::new(config)?));

    info!("Webhook server listening on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .configure(routes::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("Webhook server stopped");
    Ok(())
}
