use chatdigest_common::{ChatdigestError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default summary budget in characters
pub const DEFAULT_MAX_CHARS: usize = 1500;

/// Interval label used when the caller sends none
pub const DEFAULT_INTERVAL_LABEL: &str = "unknown";

/// Gemini list models response
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsResponse {
    /// Models on this page (absent when the key sees none)
    #[serde(default)]
    pub models: Vec<ModelInfo>,

    /// Token for the next page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One entry of the model listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name (e.g., "models/gemini-2.5-flash")
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Whether the model can serve generateContent.
    /// Entries that advertise no methods at all are given the benefit of the doubt.
    pub fn supports_generation(&self) -> bool {
        self.supported_generation_methods.is_empty()
            || self
                .supported_generation_methods
                .iter()
                .any(|m| m == "generateContent")
    }
}

/// Gemini generateContent request
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Single user turn holding the prompt
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.into()),
                }],
            }],
        }
    }
}

/// Conversation turn
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Content part (only text parts are used)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Gemini generateContent response
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Response candidate
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated.
    /// `None` when the response carries no text (e.g., blocked by safety filters).
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Error envelope returned by the Gemini API on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub status: Option<String>,
}

/// Summarizer input, as read from stdin
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SummaryRequest {
    /// Raw chat log
    #[serde(default, deserialize_with = "lenient_transcript")]
    pub transcript: String,

    /// Human label of the summarized window (e.g., "1h30m")
    #[serde(default = "default_interval_label", deserialize_with = "lenient_label")]
    pub interval_label: String,

    /// Character budget of the output; 0 means unlimited
    #[serde(default = "default_max_chars", deserialize_with = "lenient_max_chars")]
    pub max_chars: usize,
}

impl SummaryRequest {
    pub fn new(transcript: impl Into<String>, interval_label: impl Into<String>, max_chars: usize) -> Self {
        Self {
            transcript: transcript.into(),
            interval_label: interval_label.into(),
            max_chars,
        }
    }

    /// Parse the stdin payload. Empty input is read as `{}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::from_json("{}");
        }

        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(ChatdigestError::invalid_input("input must be a JSON object"));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Transcript length in characters
    pub fn transcript_chars(&self) -> usize {
        self.transcript.chars().count()
    }

    /// True when there is nothing but whitespace to summarize
    pub fn is_blank(&self) -> bool {
        self.transcript.trim().is_empty()
    }
}

fn default_interval_label() -> String {
    DEFAULT_INTERVAL_LABEL.to_string()
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

fn lenient_transcript<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => default_interval_label(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

// Malformed budgets fall back to the default; negative budgets mean unlimited.
fn lenient_max_chars<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<usize, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    Ok(match parsed {
        Some(n) if n < 0 => 0,
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        None => DEFAULT_MAX_CHARS,
    })
}

/// Summarization result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    /// Clamped summary text
    pub text: String,

    /// Model that produced the text, if any was called
    pub model: Option<String>,
}

impl Summary {
    /// Create new summary
    pub fn new(text: String, model: Option<String>) -> Self {
        Self { text, model }
    }
}
