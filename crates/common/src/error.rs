/// Chatdigest error types
#[derive(Debug, thiserror::Error)]
pub enum ChatdigestError {
    /// No API key configured
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Transport level failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Provider answered with an error status or an unreadable body
    #[error("Remote API error ({status}): {message}")]
    RemoteApi { status: u16, message: String },

    /// Listing succeeded but contained no models
    #[error("No models available from the provider")]
    NoModelsAvailable,

    /// Provider reported the requested model as unknown
    #[error("Model not found: {model}: {message}")]
    ModelNotFound { model: String, message: String },

    /// Every candidate model was tried without success
    #[error("All candidate models failed (tried: {}): {}", .attempted.join(", "), .last_error)]
    AllCandidatesFailed {
        attempted: Vec<String>,
        last_error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChatdigestError {
    /// Create missing credential error
    pub fn missing_credential<S: Into<String>>(msg: S) -> Self {
        Self::MissingCredential(msg.into())
    }

    /// Create network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Create remote API error
    pub fn remote_api<S: Into<String>>(status: u16, msg: S) -> Self {
        Self::RemoteApi {
            status,
            message: msg.into(),
        }
    }

    /// Create model not found error
    pub fn model_not_found<M: Into<String>, S: Into<String>>(model: M, msg: S) -> Self {
        Self::ModelNotFound {
            model: model.into(),
            message: msg.into(),
        }
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

// HTTP response conversion
impl ChatdigestError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Json(_) => 400,
            Self::ModelNotFound { .. } => 404,
            Self::NoModelsAvailable => 503,
            Self::Network(_) => 503,
            Self::RemoteApi { .. } => 502,
            Self::AllCandidatesFailed { .. } => 502,
            Self::MissingCredential(_) => 500,
            Self::Config(_) => 500,
            Self::Io(_) => 500,
            Self::Other(_) => 500,
        }
    }
}
