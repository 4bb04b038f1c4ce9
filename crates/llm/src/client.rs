use async_trait::async_trait;
use chatdigest_common::{ChatdigestError, Result};
use reqwest::{Client, Response};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::llm_trait::LlmClient;
use crate::selector::normalize_model_name;
use crate::types::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse, ListModelsResponse};

/// Budget for the whole model listing, all pages included
const LIST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-wide timeout, applies to generation calls
const GENERATE_TIMEOUT: Duration = Duration::from_secs(300);

const LIST_PAGE_SIZE: u32 = 1000;

/// Upper bound on listing pages followed per call
pub const MAX_LIST_PAGES: usize = 20;

/// Gemini REST API client
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: Client,
    list_timeout: Duration,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create new Gemini client
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ChatdigestError::missing_credential("Gemini API key is empty"));
        }

        let client = Client::builder()
            .timeout(GENERATE_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        info!("Gemini client initialized: {}", base_url);
        Ok(Self {
            base_url,
            api_key,
            client,
            list_timeout: LIST_TIMEOUT,
        })
    }

    /// Override the listing budget
    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.base_url)
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            normalize_model_name(model)
        )
    }

    /// Fetch one page of the model listing
    async fn list_page(&self, page_token: Option<&str>) -> Result<ListModelsResponse> {
        let mut request = self
            .client
            .get(self.models_url())
            .timeout(self.list_timeout)
            .header("x-goog-api-key", &self.api_key)
            .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChatdigestError::network(format!("Failed to list models: {}", e)))?;

        let response = check_status(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| ChatdigestError::network(format!("Failed to read model listing: {}", e)))?;

        if body.trim().is_empty() {
            return Ok(ListModelsResponse::default());
        }

        serde_json::from_str(&body).map_err(|e| {
            ChatdigestError::remote_api(200, format!("Malformed model listing: {}", e))
        })
    }

    /// Follow `nextPageToken` until it runs out, repeats, or the page cap is hit
    async fn list_all_pages(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        let mut seen_tokens = HashSet::new();
        let mut page_token: Option<String> = None;

        for page_no in 1..=MAX_LIST_PAGES {
            let page = self.list_page(page_token.as_deref()).await?;

            for model in page.models.iter().filter(|m| m.supports_generation()) {
                let name = normalize_model_name(&model.name);
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }

            page_token = match page.next_page_token.filter(|t| !t.is_empty()) {
                None => break,
                Some(token) if !seen_tokens.insert(token.clone()) => {
                    warn!("Model listing repeated page token {:?}, stopping", token);
                    break;
                }
                Some(token) => Some(token),
            };

            if page_no == MAX_LIST_PAGES {
                warn!("Model listing stopped after {} pages", MAX_LIST_PAGES);
            }
        }

        debug!("Listed {} generation models", names.len());
        Ok(names)
    }

    /// Single generateContent call
    async fn generate_content(&self, model: &str, prompt: &str) -> Result<GenerateContentResponse> {
        let request = GenerateContentRequest::from_prompt(prompt);

        debug!(
            "Sending generateContent request - Model: {}, Prompt length: {}",
            model,
            prompt.len()
        );

        let response = self
            .client
            .post(self.generate_url(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatdigestError::network(format!("Failed to send request: {}", e)))?;

        let response = check_status(response).await?;

        response.json().await.map_err(|e| {
            ChatdigestError::remote_api(200, format!("Failed to parse response: {}", e))
        })
    }
}

/// Turn a non-2xx response into `RemoteApi`, keeping the provider's status text.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}

/// Build `RemoteApi` from an error status and body: "404 NOT_FOUND: <message>"
pub(crate) fn api_error(status: u16, body: &str) -> ChatdigestError {
    let message = match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = envelope.error.code.unwrap_or(status);
            let kind = envelope.error.status.unwrap_or_default();
            let text = envelope.error.message.unwrap_or_default();
            format!("{} {}: {}", code, kind, text)
        }
        Err(_) if body.trim().is_empty() => format!("{} (empty body)", status),
        Err(_) => format!("{} {}", status, body.trim()),
    };

    ChatdigestError::remote_api(status, message)
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn list_models(&self) -> Result<Vec<String>> {
        match tokio::time::timeout(self.list_timeout, self.list_all_pages()).await {
            Ok(result) => result,
            Err(_) => Err(ChatdigestError::network(format!(
                "Model listing timed out after {}s",
                self.list_timeout.as_secs_f32()
            ))),
        }
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<Option<String>> {
        let response = self.generate_content(model, prompt).await?;
        let text = response.text();

        debug!(
            "Received response from Gemini - Model: {}, Length: {}",
            model,
            text.as_ref().map(|t| t.len()).unwrap_or(0)
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::is_model_not_found;

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new("https://example.com/", "key").unwrap();
        assert_eq!(client.models_url(), "https://example.com/v1beta/models");
        assert_eq!(
            client.generate_url("models/gemini-2.5-flash"),
            "https://example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_client_requires_key() {
        assert!(matches!(
            GeminiClient::new("https://example.com", " "),
            Err(ChatdigestError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let client = GeminiClient::new("https://example.com", "super-secret").unwrap();
        assert!(!format!("{:?}", client).contains("super-secret"));
    }

    #[test]
    fn test_api_error_from_envelope() {
        let body = r#"{"error": {"code": 404, "message": "models/gemini-1.5-flash is not found for API version v1beta", "status": "NOT_FOUND"}}"#;
        let err = api_error(404, body);
        assert_eq!(
            err.to_string(),
            "Remote API error (404): 404 NOT_FOUND: models/gemini-1.5-flash is not found for API version v1beta"
        );
        assert!(is_model_not_found(&err));
    }

    #[test]
    fn test_api_error_quota_is_not_retryable() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = api_error(429, body);
        assert!(matches!(err, ChatdigestError::RemoteApi { status: 429, .. }));
        assert!(!is_model_not_found(&err));
    }

    #[test]
    fn test_api_error_plain_body() {
        let err = api_error(502, "Bad Gateway");
        assert_eq!(err.to_string(), "Remote API error (502): 502 Bad Gateway");

        let err = api_error(500, "");
        assert_eq!(err.to_string(), "Remote API error (500): 500 (empty body)");
    }

    mod http {
        use super::*;
        use serde_json::json;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use wiremock::matchers::{header, method, path, query_param};
        use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

        fn client_for(server: &MockServer) -> GeminiClient {
            GeminiClient::new(server.uri(), "test-key").unwrap()
        }

        async fn request_count(server: &MockServer) -> usize {
            server.received_requests().await.map(|r| r.len()).unwrap_or(0)
        }

        /// Hands out a fresh page token on every call
        struct EndlessPages(AtomicUsize);

        impl Respond for EndlessPages {
            fn respond(&self, _request: &Request) -> ResponseTemplate {
                let n = self.0.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(200).set_body_json(json!({
                    "models": [{"name": format!("models/gemini-{}-flash", n)}],
                    "nextPageToken": format!("page-{}", n + 1),
                }))
            }
        }

        #[tokio::test]
        async fn test_list_models_follows_pages() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1beta/models"))
                .and(query_param("pageToken", "p2"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "models": [
                        {"name": "models/gemini-2.0-flash", "supportedGenerationMethods": ["generateContent"]},
                        {"name": "models/text-embedding-004", "supportedGenerationMethods": ["embedContent"]}
                    ]
                })))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/v1beta/models"))
                .and(header("x-goog-api-key", "test-key"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "models": [{"name": "models/gemini-2.5-flash"}],
                    "nextPageToken": "p2"
                })))
                .mount(&server)
                .await;

            let names = client_for(&server).list_models().await.unwrap();

            assert_eq!(names, vec!["gemini-2.5-flash", "gemini-2.0-flash"]);
            assert_eq!(request_count(&server).await, 2);
        }

        #[tokio::test]
        async fn test_list_models_stops_on_repeated_token() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1beta/models"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "models": [{"name": "models/gemini-2.5-flash"}],
                    "nextPageToken": "same"
                })))
                .mount(&server)
                .await;

            let names = client_for(&server).list_models().await.unwrap();

            assert_eq!(names, vec!["gemini-2.5-flash"]);
            assert_eq!(request_count(&server).await, 2);
        }

        #[tokio::test]
        async fn test_list_models_caps_pages() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1beta/models"))
                .respond_with(EndlessPages(AtomicUsize::new(0)))
                .mount(&server)
                .await;

            let names = client_for(&server).list_models().await.unwrap();

            assert_eq!(names.len(), MAX_LIST_PAGES);
            assert_eq!(request_count(&server).await, MAX_LIST_PAGES);
        }

        #[tokio::test]
        async fn test_list_models_whole_listing_timeout() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1beta/models"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"models": []}))
                        .set_delay(Duration::from_millis(500)),
                )
                .mount(&server)
                .await;

            let err = client_for(&server)
                .with_list_timeout(Duration::from_millis(100))
                .list_models()
                .await
                .unwrap_err();

            assert!(matches!(err, ChatdigestError::Network(_)), "got {}", err);
        }

        #[tokio::test]
        async fn test_list_models_without_models_field() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1beta/models"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .mount(&server)
                .await;

            let names = client_for(&server).list_models().await.unwrap();
            assert!(names.is_empty());
        }

        #[tokio::test]
        async fn test_list_models_malformed_body() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v1beta/models"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
                .mount(&server)
                .await;

            let err = client_for(&server).list_models().await.unwrap_err();
            assert!(matches!(err, ChatdigestError::RemoteApi { .. }), "got {}", err);
        }

        #[tokio::test]
        async fn test_generate_not_found_is_classified() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
                .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                    "error": {
                        "code": 404,
                        "message": "models/gemini-1.5-flash is not found for API version v1beta",
                        "status": "NOT_FOUND"
                    }
                })))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .generate("models/gemini-1.5-flash", "prompt")
                .await
                .unwrap_err();

            assert!(matches!(err, ChatdigestError::RemoteApi { status: 404, .. }));
            assert!(is_model_not_found(&err));
        }

        #[tokio::test]
        async fn test_generate_returns_text() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
                .and(header("x-goog-api-key", "test-key"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "candidates": [{"content": {"role": "model", "parts": [{"text": "- all quiet"}]}}]
                })))
                .mount(&server)
                .await;

            let text = client_for(&server)
                .generate("gemini-2.5-flash", "prompt")
                .await
                .unwrap();

            assert_eq!(text.as_deref(), Some("- all quiet"));
        }

        #[tokio::test]
        async fn test_generate_without_text() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "promptFeedback": {"blockReason": "SAFETY"}
                })))
                .mount(&server)
                .await;

            let text = client_for(&server)
                .generate("gemini-2.5-flash", "prompt")
                .await
                .unwrap();

            assert_eq!(text, None);
        }
    }
}
