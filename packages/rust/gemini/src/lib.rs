//! Minimal client for the Gemini `generateContent` API.
//!
//! Prompt in, text out. The API key travels as a query parameter, so request
//! URLs are stripped from every error this crate produces.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use volare_shared::{Result, VolareError};

/// Default API origin.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default timeout in seconds for a generation call.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("Volare/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Sampling settings sent as `generationConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str, config: GenerationConfig) -> Self {
        Self {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: config,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u64>,
    #[serde(default)]
    candidates_token_count: Option<u64>,
}

/// Text produced by one successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Text of the first part of the first candidate.
    pub text: String,
    pub finish_reason: Option<String>,
    pub prompt_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// Pull `candidates[0].content.parts[0].text` out of a response body.
fn extract_generation(body: &str) -> Result<Generation> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| VolareError::MalformedResponse(format!("generateContent: {e}")))?;

    let candidate = parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| VolareError::MalformedResponse("response has no candidates".into()))?;

    let text = candidate
        .content
        .and_then(|c| c.parts)
        .and_then(|p| p.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| {
            VolareError::MalformedResponse("first candidate has no text part".into())
        })?;

    let usage = parsed.usage_metadata;
    Ok(Generation {
        text,
        finish_reason: candidate.finish_reason,
        prompt_tokens: usage.as_ref().and_then(|u| u.prompt_token_count),
        output_tokens: usage.as_ref().and_then(|u| u.candidates_token_count),
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Connection settings for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiOptions {
    /// API origin, normally [`DEFAULT_ENDPOINT`].
    pub endpoint: String,
    pub api_key: String,
    /// Model id, e.g. `gemini-2.5-flash`.
    pub model: String,
    pub timeout_secs: u64,
}

impl GeminiOptions {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Client bound to one model.
pub struct GeminiClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(opts: &GeminiOptions) -> Result<Self> {
        if opts.api_key.trim().is_empty() {
            return Err(VolareError::config("Gemini API key is empty"));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| VolareError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!(
                "{}/v1beta/models/{}:generateContent",
                opts.endpoint.trim_end_matches('/'),
                opts.model
            ),
            api_key: opts.api_key.clone(),
            model: opts.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt and return the first candidate's text.
    #[instrument(skip_all, fields(model = %self.model, prompt_bytes = prompt.len()))]
    pub async fn generate(&self, prompt: &str, config: GenerationConfig) -> Result<Generation> {
        let request = GenerateRequest::new(prompt, config);

        debug!(
            temperature = config.temperature,
            max_output_tokens = config.max_output_tokens,
            "calling generateContent"
        );

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "generateContent failed");
            return Err(VolareError::api("generateContent", status.as_u16(), &body));
        }

        let generation = extract_generation(&body)?;
        info!(
            chars = generation.text.len(),
            finish_reason = generation.finish_reason.as_deref().unwrap_or("unknown"),
            output_tokens = generation.output_tokens,
            "generation complete"
        );
        Ok(generation)
    }
}

/// Map a reqwest error without leaking the key-bearing URL.
fn transport_error(e: reqwest::Error) -> VolareError {
    if e.is_timeout() {
        VolareError::Network("generateContent: request timed out".into())
    } else {
        VolareError::Network(format!("generateContent: {}", e.without_url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CONFIG: GenerationConfig = GenerationConfig {
        temperature: 0.8,
        max_output_tokens: 2000,
    };

    fn client_for(server: &MockServer) -> GeminiClient {
        let opts = GeminiOptions {
            endpoint: server.uri(),
            ..GeminiOptions::new("test-key", "gemini-2.5-flash")
        };
        GeminiClient::new(&opts).unwrap()
    }

    #[test]
    fn request_serializes_to_api_shape() {
        let json = serde_json::to_value(GenerateRequest::new("hello", CONFIG)).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2000);
        let temp = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.8).abs() < 1e-6);
    }

    #[test]
    fn extracts_first_candidate_text() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "ignored"}]}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "second"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 512, "candidatesTokenCount": 900}
        }"#;
        let generation = extract_generation(body).unwrap();
        assert_eq!(generation.text, "first");
        assert_eq!(generation.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(generation.prompt_tokens, Some(512));
        assert_eq!(generation.output_tokens, Some(900));
    }

    #[test]
    fn missing_candidates_is_malformed() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = extract_generation(body).unwrap_err();
        assert!(matches!(err, VolareError::MalformedResponse(_)));
        assert!(err.to_string().contains("no candidates"));
    }

    #[test]
    fn candidate_without_parts_is_malformed() {
        let body = r#"{"candidates": [{"finishReason": "MAX_TOKENS", "content": {}}]}"#;
        assert!(matches!(
            extract_generation(body),
            Err(VolareError::MalformedResponse(_))
        ));
    }

    #[test]
    fn empty_api_key_rejected() {
        let result = GeminiClient::new(&GeminiOptions::new("  ", "m"));
        assert!(matches!(result, Err(VolareError::Config { .. })));
    }

    #[tokio::test]
    async fn generate_posts_prompt_with_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"parts": [{"text": "write something"}]}],
                "generationConfig": {"maxOutputTokens": 2000}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "An article."}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generation = client_for(&server)
            .generate("write something", CONFIG)
            .await
            .unwrap();
        assert_eq!(generation.text, "An article.");
    }

    #[tokio::test]
    async fn error_status_is_api_error_without_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).set_body_string(r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).generate("p", CONFIG).await.unwrap_err();
        assert!(matches!(err, VolareError::Api { status: 429, .. }));
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn transport_error_hides_key() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        drop(server);

        let err = client.generate("p", CONFIG).await.unwrap_err();
        assert!(matches!(err, VolareError::Network(_)));
        assert!(!err.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn slow_generation_times_out_as_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "candidates": [{"content": {"parts": [{"text": "late"}]}}]
                    }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let opts = GeminiOptions {
            endpoint: server.uri(),
            timeout_secs: 1,
            ..GeminiOptions::new("test-key", "gemini-2.5-flash")
        };
        let err = GeminiClient::new(&opts)
            .unwrap()
            .generate("p", CONFIG)
            .await
            .unwrap_err();
        assert!(matches!(err, VolareError::Network(_)));
        assert!(err.to_string().contains("timed out"));
        assert!(!err.to_string().contains("test-key"));
    }
}
