//! Adaptive model selection
//!
//! The provider retires and renames model versions over time, so instead of
//! pinning one name the selector ranks whatever "flash" models the live
//! listing offers. An explicit preference that is present in the listing
//! always wins.

use chatdigest_common::{ChatdigestError, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::llm_trait::LlmClient;

/// Resource prefix used by the listing endpoint
pub const MODEL_NAME_PREFIX: &str = "models/";

const FLASH_MARKER: &str = "flash";
const LITE_MARKER: &str = "lite";
const PREVIEW_MARKERS: [&str; 3] = ["preview", "exp", "experimental"];

/// Strip surrounding whitespace and the `models/` prefix
pub fn normalize_model_name(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix(MODEL_NAME_PREFIX).unwrap_or(name)
}

fn is_flash(name: &str) -> bool {
    name.to_lowercase().contains(FLASH_MARKER)
}

fn is_preview(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREVIEW_MARKERS.iter().any(|m| lower.contains(m))
}

fn is_lite(name: &str) -> bool {
    name.to_lowercase().contains(LITE_MARKER)
}

/// Every digit run in the name, in order: "gemini-2.5-flash-001" -> [2, 5, 1]
fn version_tokens(name: &str) -> Vec<u64> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("valid digit pattern"));

    re.find_iter(name)
        .filter_map(|m| m.as_str().parse::<u64>().ok())
        .collect()
}

/// Ordering key, compared field by field; greater is better
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    stable: bool,
    full: bool,
    version: Vec<u64>,
}

impl RankKey {
    fn of(name: &str) -> Self {
        Self {
            stable: !is_preview(name),
            full: !is_lite(name),
            version: version_tokens(name),
        }
    }
}

fn dedup_normalized(names: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(names.len());
    for name in names {
        let name = normalize_model_name(name);
        if !name.is_empty() && !seen.iter().any(|s: &String| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Flash models from `names`, best first. Equal ranks keep listing order.
pub fn rank_flash_models(names: &[String]) -> Vec<String> {
    let mut flash: Vec<String> = dedup_normalized(names)
        .into_iter()
        .filter(|name| is_flash(name))
        .collect();

    flash.sort_by(|a, b| RankKey::of(b).cmp(&RankKey::of(a)));
    flash
}

/// Pick the best model from a listing.
///
/// Preference (bare or `models/` prefixed) wins when listed; otherwise the
/// top-ranked flash model; otherwise the first listed model.
pub fn pick_model(names: &[String], preferred: Option<&str>) -> Result<String> {
    let listed = dedup_normalized(names);
    if listed.is_empty() {
        return Err(ChatdigestError::NoModelsAvailable);
    }

    if let Some(preferred) = preferred.map(normalize_model_name).filter(|p| !p.is_empty()) {
        if listed.iter().any(|name| name == preferred) {
            debug!("Using preferred model: {}", preferred);
            return Ok(preferred.to_string());
        }
        debug!("Preferred model {} not in listing, falling back to ranking", preferred);
    }

    if let Some(best) = rank_flash_models(&listed).into_iter().next() {
        return Ok(best);
    }

    Ok(listed[0].clone())
}

/// Resolves the model to use against the live listing
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    preferred: Option<String>,
}

impl ModelSelector {
    /// Create new selector with an optional pinned model
    pub fn new(preferred: Option<String>) -> Self {
        Self { preferred }
    }

    pub fn preferred(&self) -> Option<&str> {
        self.preferred.as_deref()
    }

    /// Fetch the listing and pick from it
    pub async fn pick<C: LlmClient + ?Sized>(&self, client: &C) -> Result<String> {
        let names = client.list_models().await?;
        let model = pick_model(&names, self.preferred())?;
        info!("Selected model {} from {} listed", model, names.len());
        Ok(model)
    }
}
