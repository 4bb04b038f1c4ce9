//! Chatdigest LLM Integration
//!
//! Gemini API client, adaptive model selection and chat summarization

mod clamp;
mod classify;
mod client;
mod llm_trait;
mod prompts;
mod selector;
mod summarize;
mod types;

pub use clamp::{clamp_to_chars, ELLIPSIS};
pub use classify::{is_model_not_found, is_model_not_found_message};
pub use client::GeminiClient;
pub use llm_trait::LlmClient;
pub use prompts::{summary_prompt, BASE_PROMPT, NO_SUMMARY_RETURNED};
pub use selector::{normalize_model_name, pick_model, rank_flash_models, ModelSelector, MODEL_NAME_PREFIX};
pub use summarize::{build_candidates, Summarizer, MAX_CANDIDATES, NOTHING_TO_SUMMARIZE};
pub use types::{
    GenerateContentRequest, GenerateContentResponse, ListModelsResponse, ModelInfo, Summary,
    SummaryRequest, DEFAULT_INTERVAL_LABEL, DEFAULT_MAX_CHARS,
};
