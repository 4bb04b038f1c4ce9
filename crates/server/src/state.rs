use chatdigest_common::{AppConfig, Result};

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Webhook verification secret
    verify_token: String,
}

impl AppState {
    /// Create new application state; fails when no verification secret is configured
    pub fn new(config: AppConfig) -> Result<Self> {
        let verify_token = config.require_verify_token()?.to_string();

        Ok(Self {
            config,
            verify_token,
        })
    }

    pub fn verify_token(&self) -> &str {
        &self.verify_token
    }
}
