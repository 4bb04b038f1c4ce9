//! Prompt template for chat summaries

/// Role line at the top of every summary prompt
pub const BASE_PROMPT: &str = "You are a WhatsApp group chat summarizer.";

/// Fallback text when the model answers without any text
pub const NO_SUMMARY_RETURNED: &str = "No summary returned.";

/// Output-language instruction
fn language_directive(language: Option<&str>) -> String {
    match language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(language) => format!("- Write the summary in {}.", language),
        None => "- Write the summary in the main language of the chat log.".to_string(),
    }
}

/// Prompt for summarizing a chat window.
///
/// The character ceiling is restated for the model, but only the clamper
/// enforces it.
pub fn summary_prompt(
    interval_label: &str,
    max_chars: usize,
    transcript: &str,
    language: Option<&str>,
) -> String {
    let ceiling = if max_chars == 0 {
        "- Keep the entire output concise.".to_string()
    } else {
        format!("- Keep the entire output under {} characters.", max_chars)
    };

    format!(
        r#"{base}

Task:
Summarize what happened in this group chat during the last {interval}.

Output requirements:
- 5–10 concise bullet points
- Then: "Open questions / next actions" (0–5 bullets)
- Then: "Notable quotes" (0–3 short quotes) ONLY if genuinely funny/important
- Do not invent facts. If unclear, say so briefly.
- Group by topic when there are multiple topics.
{language}
{ceiling}

Chat log:
{transcript}"#,
        base = BASE_PROMPT,
        interval = interval_label,
        language = language_directive(language),
        ceiling = ceiling,
        transcript = transcript,
    )
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt_interpolation() {
        let prompt = summary_prompt("1h30m", 800, "alice: hi\nbob: hey", None);
        assert!(prompt.starts_with(BASE_PROMPT));
        assert!(prompt.contains("during the last 1h30m."));
        assert!(prompt.contains("under 800 characters"));
        assert!(prompt.contains("main language of the chat log"));
        assert!(prompt.ends_with("alice: hi\nbob: hey"));
    }

    #[test]
    fn test_summary_prompt_language() {
        let prompt = summary_prompt("10m", 1500, "x", Some("Portuguese"));
        assert!(prompt.contains("- Write the summary in Portuguese."));
    }

    #[test]
    fn test_summary_prompt_unlimited() {
        let prompt = summary_prompt("10m", 0, "x", None);
        assert!(!prompt.contains("under 0 characters"));
        assert!(prompt.contains("concise"));
    }
}
