use async_trait::async_trait;
use chatdigest_common::Result;

/// Capability the summarizer needs from a text-generation provider
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Names of the models usable for generation, `models/` prefix stripped
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Generate text for `prompt` with `model`.
    /// `Ok(None)` means the provider answered without any text.
    async fn generate(&self, model: &str, prompt: &str) -> Result<Option<String>>;
}
