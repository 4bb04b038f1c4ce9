use serde::{Deserialize, Serialize};

/// Mode value the hub sends when subscribing
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Body returned on a rejected verification
pub const VERIFICATION_FAILED: &str = "Verification failed";

/// Webhook verification query (`hub.*` parameters)
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    /// Expected to be "subscribe"
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,

    /// Shared secret configured on both sides
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,

    /// Value to echo back on success
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl VerifyQuery {
    /// True for a subscribe request carrying the expected secret
    pub fn is_valid(&self, expected_token: &str) -> bool {
        self.mode.as_deref() == Some(SUBSCRIBE_MODE)
            && self.verify_token.as_deref() == Some(expected_token)
    }
}

/// Status-only JSON response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn received() -> Self {
        Self { status: "received" }
    }

    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}
