use chatdigest_common::{ChatdigestError, Result};
use tracing::{debug, info, warn};

use crate::clamp::clamp_to_chars;
use crate::classify::is_model_not_found;
use crate::llm_trait::LlmClient;
use crate::prompts::{summary_prompt, NO_SUMMARY_RETURNED};
use crate::selector::{normalize_model_name, rank_flash_models, ModelSelector};
use crate::types::{Summary, SummaryRequest};

/// Output for a blank transcript
pub const NOTHING_TO_SUMMARIZE: &str = "Nothing to summarize (no transcript).";

/// Maximum number of models tried per request
pub const MAX_CANDIDATES: usize = 3;

/// Primary model first, then other flash models in rank order, deduplicated
pub fn build_candidates(primary: &str, listing: &[String]) -> Vec<String> {
    let mut candidates = vec![normalize_model_name(primary).to_string()];

    for name in rank_flash_models(listing) {
        if candidates.len() >= MAX_CANDIDATES {
            break;
        }
        if !candidates.contains(&name) {
            candidates.push(name);
        }
    }

    candidates
}

/// Chat summarizer with model fallback
pub struct Summarizer<C> {
    client: C,
    selector: ModelSelector,
    language: Option<String>,
}

impl<C: LlmClient> Summarizer<C> {
    /// Create new summarizer
    pub fn new(client: C, selector: ModelSelector) -> Self {
        Self {
            client,
            selector,
            language: None,
        }
    }

    /// Language the summary should be written in
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Summarize a chat transcript
    pub async fn summarize(&self, request: &SummaryRequest) -> Result<Summary> {
        if request.is_blank() {
            debug!("Blank transcript, nothing to summarize");
            return Ok(Summary::new(NOTHING_TO_SUMMARIZE.to_string(), None));
        }

        info!(
            "Starting summarization - Interval: {}, Transcript length: {} chars, Budget: {}",
            request.interval_label,
            request.transcript_chars(),
            request.max_chars
        );

        let prompt = summary_prompt(
            &request.interval_label,
            request.max_chars,
            &request.transcript,
            self.language.as_deref(),
        );

        let candidates = self.candidates().await?;
        self.generate_with_fallback(&candidates, &prompt, request.max_chars)
            .await
    }

    /// Candidate list for one request. A failing listing refresh only
    /// shortens the list.
    async fn candidates(&self) -> Result<Vec<String>> {
        let primary = self.selector.pick(&self.client).await?;

        let candidates = match self.client.list_models().await {
            Ok(listing) => build_candidates(&primary, &listing),
            Err(e) => {
                warn!("Model listing refresh failed, trying {} only: {}", primary, e);
                vec![primary]
            }
        };

        debug!("Candidate models: {:?}", candidates);
        Ok(candidates)
    }

    /// Try each candidate in order; only "model not found" moves on to the next.
    async fn generate_with_fallback(
        &self,
        candidates: &[String],
        prompt: &str,
        max_chars: usize,
    ) -> Result<Summary> {
        let mut attempted = Vec::with_capacity(candidates.len());
        let mut last_error: Option<ChatdigestError> = None;

        for model in candidates {
            attempted.push(model.clone());

            match self.client.generate(model, prompt).await {
                Ok(text) => {
                    let text = text.unwrap_or_else(|| NO_SUMMARY_RETURNED.to_string());
                    let clamped = clamp_to_chars(&text, max_chars);
                    info!(
                        "Summary generated - Model: {}, Length: {} chars",
                        model,
                        clamped.chars().count()
                    );
                    return Ok(Summary::new(clamped, Some(model.clone())));
                }
                Err(e) if is_model_not_found(&e) => {
                    warn!("Model {} not available, trying next candidate: {}", model, e);
                    last_error = Some(ChatdigestError::model_not_found(model.as_str(), e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Err(ChatdigestError::AllCandidatesFailed {
            attempted,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no candidate models".to_string()),
        })
    }
}
