use crate::error::ChatdigestError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default Gemini API root
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Chatdigest application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key (required for summarization)
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,

    /// Preferred model name, bare or `models/` prefixed
    pub gemini_model: Option<String>,

    /// Gemini API base URL
    pub gemini_base_url: String,

    /// Language the summary should be written in
    pub summary_language: Option<String>,

    /// Webhook verification shared secret
    #[serde(skip_serializing)]
    pub verify_token: Option<String>,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            summary_language: None,
            verify_token: None,
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            log_dir: Self::default_log_dir(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, ChatdigestError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let config = Self {
            gemini_api_key: Self::get_env_string("GEMINI_API_KEY"),
            gemini_model: Self::get_env_string("GEMINI_MODEL"),
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            summary_language: Self::get_env_string("SUMMARY_LANGUAGE"),
            verify_token: Self::get_env_string("VERIFY_TOKEN"),
            server_host: std::env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            log_dir: std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| Self::default_log_dir()),
            log_level: std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string()),
        };

        config.validate()?;

        Ok(config)
    }

    /// Per-user log directory, independent of the caller's working directory
    pub fn default_log_dir() -> PathBuf {
        #[cfg(target_os = "linux")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join(".cache/chatdigest/log");
            }
        }

        #[cfg(target_os = "macos")]
        {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join("Library/Logs/chatdigest");
            }
        }

        #[cfg(target_os = "windows")]
        {
            if let Some(local_app_data) = std::env::var_os("LOCALAPPDATA") {
                return PathBuf::from(local_app_data).join("chatdigest\\log");
            }
        }

        // Fallback
        std::env::temp_dir().join("chatdigest")
    }

    /// Non-blank environment variable
    fn get_env_string(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// API key, or `MissingCredential` when none is configured
    pub fn require_api_key(&self) -> Result<&str, ChatdigestError> {
        self.gemini_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ChatdigestError::missing_credential("Missing GEMINI_API_KEY environment variable")
            })
    }

    /// Webhook secret, required before the server starts
    pub fn require_verify_token(&self) -> Result<&str, ChatdigestError> {
        self.verify_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ChatdigestError::config("VERIFY_TOKEN must be set to serve the webhook"))
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ChatdigestError> {
        if self.gemini_base_url.is_empty() {
            return Err(ChatdigestError::config("Gemini base URL cannot be empty"));
        }

        if !self.gemini_base_url.starts_with("http://")
            && !self.gemini_base_url.starts_with("https://") {
            return Err(ChatdigestError::config(
                "Gemini base URL must start with http:// or https://"
            ));
        }

        Ok(())
    }

    /// Validate the settings only the webhook server needs
    pub fn validate_server(&self) -> Result<(), ChatdigestError> {
        self.validate()?;

        if self.server_port == 0 {
            return Err(ChatdigestError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_server_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.gemini_base_url = "ftp://example.com".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_port = AppConfig::default();
        invalid_port.server_port = 0;
        assert!(invalid_port.validate_server().is_err());
    }

    #[test]
    fn test_server_port_does_not_affect_summarizer_validation() {
        let mut config = AppConfig::default();
        config.server_port = 0;
        assert!(config.validate().is_ok());
        assert!(config.validate_server().is_err());
    }

    #[test]
    fn test_default_log_dir_is_absolute() {
        let dir = AppConfig::default_log_dir();
        assert!(dir.is_absolute(), "{}", dir.display());
        assert!(dir.to_string_lossy().contains("chatdigest"));
    }

    #[test]
    fn test_require_api_key() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.require_api_key(),
            Err(ChatdigestError::MissingCredential(_))
        ));

        config.gemini_api_key = Some("   ".to_string());
        assert!(config.require_api_key().is_err());

        config.gemini_api_key = Some("secret".to_string());
        assert_eq!(config.require_api_key().unwrap(), "secret");
    }

    #[test]
    fn test_require_verify_token() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.require_verify_token(),
            Err(ChatdigestError::Config(_))
        ));

        config.verify_token = Some("hub-secret".to_string());
        assert_eq!(config.require_verify_token().unwrap(), "hub-secret");
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut config = AppConfig::default();
        config.gemini_api_key = Some("secret".to_string());
        config.verify_token = Some("hub-secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
