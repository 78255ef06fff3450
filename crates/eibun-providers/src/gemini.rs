//! Gemini `generateContent` backend.
//!
//! Performs the upstream call with bounded retry on transient failures:
//! 5xx responses, timeouts, and network errors are retried with exponential
//! backoff; 4xx responses and structurally empty candidate lists are
//! surfaced immediately.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use eibun_core::error::UpstreamError;
use eibun_core::traits::{GenerateRequest, TextGenerator};

use crate::config::GeminiConfig;

/// Gemini API backend.
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self { config, client }
    }

    /// One attempt, no retry.
    async fn attempt(&self, request: &GenerateRequest) -> Result<String, UpstreamError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
                response_mime_type: request
                    .json_output
                    .then(|| "application/json".to_string()),
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout(self.config.timeout_secs)
                } else {
                    UpstreamError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status >= 500 {
            let message = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Http { status, message });
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(UpstreamError::Rejected { status, message });
        }

        let api_response: GenerateContentResponse =
            response.json().await.map_err(|e| UpstreamError::Rejected {
                status,
                message: format!("failed to parse response: {e}"),
            })?;

        // An empty string here is not an error: the normalizer decides what
        // to do with it. Only a missing candidate/part structure counts as
        // a rejection.
        api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                UpstreamError::NoCandidate("response contained no candidate text".into())
            })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %self.config.model))]
    async fn generate(&self, request: &GenerateRequest) -> Result<String, UpstreamError> {
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);
        let mut last_error = None;
        let attempts = self.config.max_retries + 1;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            match self.attempt(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() => {
                    tracing::warn!(attempt, error = %e, "transient upstream failure");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(UpstreamError::Unavailable {
            attempts,
            last_error: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> GeminiConfig {
        GeminiConfig {
            api_key: "test-key".into(),
            base_url: server.uri(),
            retry_delay_ms: 10,
            ..GeminiConfig::default()
        }
    }

    fn test_request() -> GenerateRequest {
        GenerateRequest {
            prompt: "evaluate this".into(),
            temperature: 0.7,
            max_output_tokens: 1536,
            json_output: true,
        }
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": text}]}}
            ]
        })
    }

    #[tokio::test]
    async fn successful_generation_extracts_candidate_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_body("{\"corrected\":\"x\"}")),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server));
        let text = client.generate(&test_request()).await.unwrap();
        assert_eq!(text, "{\"corrected\":\"x\"}");
    }

    #[tokio::test]
    async fn transient_errors_are_retried_until_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("recovered")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server));
        let text = client.generate(&test_request()).await.unwrap();
        assert_eq!(text, "recovered");
    }

    #[tokio::test]
    async fn client_errors_fail_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "API key not valid"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server));
        let err = client.generate(&test_request()).await.unwrap_err();
        match err {
            UpstreamError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn exhausted_retries_report_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .expect(4)
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server));
        let err = client.generate(&test_request()).await.unwrap_err();
        match err {
            UpstreamError::Unavailable {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 4);
                assert!(last_error.contains("503"));
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_candidate_list_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server));
        let err = client.generate(&test_request()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::NoCandidate(_)));
    }

    #[tokio::test]
    async fn empty_candidate_text_passes_through() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("")))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server));
        let text = client.generate(&test_request()).await.unwrap();
        assert!(text.is_empty());
    }
}
