//! Generation Client: the single point of contact with the Gemini API.
//!
//! ARCHITECTURAL RULE: no other module may call the provider directly. All
//! generation traffic goes through [`GenerationClient`], which owns the
//! request timeout, failure classification, bounded retry, and response
//! normalization.
//!
//! Retry policy: only `Network`-class failures (transport errors, 5xx) are
//! retried, sequentially and at most [`MAX_ATTEMPTS`] times in total.
//! Timeouts, auth, rate-limit, and malformed-response failures are returned
//! after a single attempt.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;

/// Total attempts for one `generate` call (1 initial + 1 retry).
const MAX_ATTEMPTS: u32 = 2;
/// Fixed pause between retry attempts.
const RETRY_DELAY: Duration = Duration::from_millis(500);
/// Output cap sent with every request.
const MAX_OUTPUT_TOKENS: u32 = 2048;
/// Upper bound on the health-check round trip, independent of the
/// configured generation timeout.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
const HEALTH_PROMPT: &str = "Respond with 'OK' only.";

/// Stable classification of a failed generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    Auth,
    RateLimit,
    Timeout,
    Network,
    InvalidResponse,
    Unknown,
}

impl GenerationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationErrorKind::Auth => "auth",
            GenerationErrorKind::RateLimit => "rate_limit",
            GenerationErrorKind::Timeout => "timeout",
            GenerationErrorKind::Network => "network",
            GenerationErrorKind::InvalidResponse => "invalid_response",
            GenerationErrorKind::Unknown => "unknown",
        }
    }
}

/// Classified generation failure. Messages are safe for users and logs:
/// they never contain the credential or the raw provider payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("API authentication failed, check the provider credential configuration")]
    Auth { correlation_id: String },

    #[error("rate limit exceeded, please try again later")]
    RateLimit {
        correlation_id: String,
        /// Provider-supplied Retry-After hint, when present.
        retry_after_secs: Option<u64>,
    },

    #[error("request timed out, please try again")]
    Timeout { correlation_id: String },

    #[error("network error while contacting the generation provider: {message}")]
    Network {
        correlation_id: String,
        message: String,
    },

    #[error("provider returned a response without generated content")]
    InvalidResponse { correlation_id: String },

    #[error("content generation failed: {message}")]
    Unknown {
        correlation_id: String,
        message: String,
    },
}

impl GenerationError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            GenerationError::Auth { .. } => GenerationErrorKind::Auth,
            GenerationError::RateLimit { .. } => GenerationErrorKind::RateLimit,
            GenerationError::Timeout { .. } => GenerationErrorKind::Timeout,
            GenerationError::Network { .. } => GenerationErrorKind::Network,
            GenerationError::InvalidResponse { .. } => GenerationErrorKind::InvalidResponse,
            GenerationError::Unknown { .. } => GenerationErrorKind::Unknown,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            GenerationError::Auth { correlation_id }
            | GenerationError::RateLimit { correlation_id, .. }
            | GenerationError::Timeout { correlation_id }
            | GenerationError::Network { correlation_id, .. }
            | GenerationError::InvalidResponse { correlation_id }
            | GenerationError::Unknown { correlation_id, .. } => correlation_id,
        }
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            GenerationError::RateLimit {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}

/// Normalized output of a successful generation call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub content: String,
    pub latency_ms: u64,
    pub correlation_id: String,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

/// Outcome of [`GenerationClient::health_check`]. Always returned, never
/// thrown past the health-check boundary.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthState,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// ── Gemini wire types ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Extracts the first text part, if the response carries one.
    fn text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
    }
}

// ── Client ──────────────────────────────────────────────────────────────────

/// Client for the Gemini `generateContent` endpoint. Holds only immutable
/// configuration; concurrent calls share nothing mutable.
#[derive(Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    default_temperature: f32,
}

impl GenerationClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            timeout: Duration::from_secs(config.gemini_timeout_secs),
            default_temperature: config.gemini_temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a prompt to the provider and returns the normalized result.
    ///
    /// A caller-supplied `correlation_id` is treated as opaque and echoed on
    /// the result or error; when absent a fresh UUID is attached before any
    /// network activity.
    pub async fn generate(
        &self,
        prompt: &str,
        temperature: Option<f32>,
        correlation_id: Option<String>,
    ) -> Result<GenerationResult, GenerationError> {
        let correlation_id =
            correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        self.call(prompt, temperature, correlation_id, self.timeout)
            .await
    }

    /// Low-cost diagnostic round trip. Classified failures become an
    /// `unhealthy` report; this method itself cannot fail.
    pub async fn health_check(&self) -> HealthReport {
        let timeout = self.timeout.min(HEALTH_TIMEOUT);
        match self
            .call(HEALTH_PROMPT, Some(0.0), "health-check".to_string(), timeout)
            .await
        {
            Ok(result) => HealthReport {
                status: HealthState::Healthy,
                model: self.model.clone(),
                latency_ms: Some(result.latency_ms),
                detail: None,
            },
            Err(err) => {
                error!(kind = err.kind().as_str(), "generation health check failed");
                HealthReport {
                    status: HealthState::Unhealthy,
                    model: self.model.clone(),
                    latency_ms: None,
                    detail: Some(err.to_string()),
                }
            }
        }
    }

    async fn call(
        &self,
        prompt: &str,
        temperature: Option<f32>,
        correlation_id: String,
        timeout: Duration,
    ) -> Result<GenerationResult, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::Unknown {
                correlation_id,
                message: "prompt cannot be empty".to_string(),
            });
        }

        let temperature = match temperature {
            None => self.default_temperature,
            Some(t) if (0.0..=1.0).contains(&t) => t,
            Some(t) => {
                return Err(GenerationError::Unknown {
                    correlation_id,
                    message: format!("temperature {t} is outside the range 0.0..=1.0"),
                })
            }
        };

        info!(
            correlation_id = %correlation_id,
            model = %self.model,
            prompt_length = prompt.len(),
            temperature,
            "generation request initiated"
        );

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let mut last_network_error: Option<GenerationError> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                warn!(
                    correlation_id = %correlation_id,
                    attempt,
                    delay_ms = RETRY_DELAY.as_millis() as u64,
                    "retrying generation request after network failure"
                );
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let started = Instant::now();
            let response = self
                .http
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .timeout(timeout)
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    error!(
                        correlation_id = %correlation_id,
                        latency_ms = started.elapsed().as_millis() as u64,
                        kind = "timeout",
                        "generation request failed"
                    );
                    return Err(GenerationError::Timeout { correlation_id });
                }
                Err(e) => {
                    last_network_error = Some(GenerationError::Network {
                        correlation_id: correlation_id.clone(),
                        message: if e.is_connect() {
                            "connection failed".to_string()
                        } else {
                            "transport error".to_string()
                        },
                    });
                    continue;
                }
            };

            let status = response.status();

            if status.is_success() {
                let parsed = match response.json::<GenerateContentResponse>().await {
                    Ok(p) => p,
                    Err(e) if e.is_timeout() => {
                        return Err(GenerationError::Timeout { correlation_id })
                    }
                    Err(_) => {
                        error!(
                            correlation_id = %correlation_id,
                            kind = "invalid_response",
                            "generation response body could not be decoded"
                        );
                        return Err(GenerationError::InvalidResponse { correlation_id });
                    }
                };
                let latency_ms = started.elapsed().as_millis() as u64;

                let content = match parsed.text().map(|t| normalize_output(&t)) {
                    Some(c) if !c.is_empty() => c,
                    _ => {
                        error!(
                            correlation_id = %correlation_id,
                            latency_ms,
                            kind = "invalid_response",
                            "generation response carried no content"
                        );
                        return Err(GenerationError::InvalidResponse { correlation_id });
                    }
                };

                info!(
                    correlation_id = %correlation_id,
                    latency_ms,
                    content_length = content.len(),
                    "generation request completed"
                );

                return Ok(GenerationResult {
                    content,
                    latency_ms,
                    correlation_id,
                    model: self.model.clone(),
                });
            }

            // Non-success status: classify by the provider's signal, not by
            // free-text matching.
            let latency_ms = started.elapsed().as_millis() as u64;
            match status.as_u16() {
                401 | 403 => {
                    error!(
                        correlation_id = %correlation_id,
                        latency_ms,
                        kind = "auth",
                        "generation request failed"
                    );
                    return Err(GenerationError::Auth { correlation_id });
                }
                429 => {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok());
                    warn!(
                        correlation_id = %correlation_id,
                        latency_ms,
                        kind = "rate_limit",
                        retry_after_secs,
                        "generation request failed"
                    );
                    return Err(GenerationError::RateLimit {
                        correlation_id,
                        retry_after_secs,
                    });
                }
                s if status.is_server_error() => {
                    warn!(
                        correlation_id = %correlation_id,
                        latency_ms,
                        status = s,
                        kind = "network",
                        "generation request failed, provider-side error"
                    );
                    last_network_error = Some(GenerationError::Network {
                        correlation_id: correlation_id.clone(),
                        message: format!("provider returned status {s}"),
                    });
                    continue;
                }
                s => {
                    error!(
                        correlation_id = %correlation_id,
                        latency_ms,
                        status = s,
                        kind = "unknown",
                        "generation request failed"
                    );
                    return Err(GenerationError::Unknown {
                        correlation_id,
                        message: format!("provider returned unexpected status {s}"),
                    });
                }
            }
        }

        Err(last_network_error.unwrap_or(GenerationError::Unknown {
            correlation_id,
            message: "generation attempts exhausted".to_string(),
        }))
    }
}

/// Normalizes generated content for storage: trims surrounding whitespace,
/// converts CRLF/CR line endings to LF, and collapses runs of three or more
/// newlines down to two.
fn normalize_output(content: &str) -> String {
    let unified = content.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed = unified.trim();

    let mut out = String::with_capacity(trimmed.len());
    let mut newline_run = 0usize;
    for ch in trimmed.chars() {
        if ch == '\n' {
            newline_run += 1;
            if newline_run <= 2 {
                out.push(ch);
            }
        } else {
            newline_run = 0;
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_MODEL: &str = "gemini-3-flash-preview";

    fn test_client(base_url: &str, timeout: Duration) -> GenerationClient {
        GenerationClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: "test-key".to_string(),
            model: TEST_MODEL.to_string(),
            timeout,
            default_temperature: 0.7,
        }
    }

    fn generate_path() -> String {
        format!("/v1beta/models/{TEST_MODEL}:generateContent")
    }

    fn success_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [
                { "content": { "parts": [ { "text": text } ] } }
            ]
        })
    }

    #[tokio::test]
    async fn test_success_normalizes_content_and_echoes_correlation_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(success_body("  \n\nDear team,\nHello\n\n\n\nRegards\n ")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let result = client
            .generate("write an email", None, Some("req-42".to_string()))
            .await
            .unwrap();

        assert_eq!(result.content, "Dear team,\nHello\n\nRegards");
        assert_eq!(result.correlation_id, "req-42");
        assert_eq!(result.model, TEST_MODEL);
    }

    #[tokio::test]
    async fn test_missing_correlation_id_generates_nonempty_one() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let result = client.generate("hello", None, None).await.unwrap();
        assert!(!result.correlation_id.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_returned_after_single_attempt_with_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let err = client
            .generate("hello", None, Some("req-1".to_string()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), GenerationErrorKind::RateLimit);
        assert_eq!(err.correlation_id(), "req-1");
        assert_eq!(err.retry_after_secs(), Some(7));
    }

    #[tokio::test]
    async fn test_auth_failure_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let err = client.generate("hello", None, None).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_server_errors_retried_up_to_bound() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(503))
            .expect(MAX_ATTEMPTS as u64)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let err = client.generate("hello", None, None).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::Network);
    }

    #[tokio::test]
    async fn test_server_error_then_success_is_transparent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("recovered")))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let result = client.generate("hello", None, None).await.unwrap();
        assert_eq!(result.content, "recovered");
    }

    #[tokio::test]
    async fn test_timeout_not_retried_and_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body("late"))
                    .set_delay(Duration::from_secs(10)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_millis(250));
        let started = Instant::now();
        let err = client.generate("hello", None, None).await.unwrap_err();
        let elapsed = started.elapsed();

        assert_eq!(err.kind(), GenerationErrorKind::Timeout);
        assert!(
            elapsed < Duration::from_secs(3),
            "call must return near the configured timeout, took {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn test_response_without_content_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let err = client.generate("hello", None, None).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_unexpected_client_status_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(418))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let err = client.generate("hello", None, None).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::Unknown);
    }

    #[tokio::test]
    async fn test_out_of_range_temperature_rejected_before_network() {
        // Unroutable base URL: the guard must fire before any connection.
        let client = test_client("http://127.0.0.1:1", Duration::from_secs(1));
        let err = client.generate("hello", Some(1.5), None).await.unwrap_err();
        assert_eq!(err.kind(), GenerationErrorKind::Unknown);
    }

    #[tokio::test]
    async fn test_temperature_is_sent_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .and(body_partial_json(json!({
                "generationConfig": { "temperature": 0.2 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        client.generate("hello", Some(0.2), None).await.unwrap();
    }

    #[tokio::test]
    async fn test_health_check_healthy_on_minimal_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("OK")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let report = client.health_check().await;
        assert_eq!(report.status, HealthState::Healthy);
        assert!(report.latency_ms.is_some());
        assert!(report.detail.is_none());
    }

    #[tokio::test]
    async fn test_health_check_unhealthy_on_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Duration::from_secs(5));
        let report = client.health_check().await;
        assert_eq!(report.status, HealthState::Unhealthy);
        assert!(report.detail.is_some());
    }

    #[test]
    fn test_normalize_trims_and_collapses_newlines() {
        assert_eq!(normalize_output("  hello  "), "hello");
        assert_eq!(normalize_output("a\r\nb\rc"), "a\nb\nc");
        assert_eq!(normalize_output("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_output("\n\n"), "");
        // Already-normalized content passes through unchanged.
        assert_eq!(normalize_output("a\n\nb"), "a\n\nb");
    }
}
