//! HTTP backend abstraction for the Gemini API.
//!
//! A trait-based backend allows dependency injection and easy testing. The
//! production implementation uses reqwest with automatic retry for transient
//! errors.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::GeminiClientConfig;
use crate::error::{GeminiError, GeminiResult};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that can POST JSON and decode a JSON reply.
///
/// This is an implementation detail - external code should use the core
/// `GenerationPort` / `SynthesisPort` traits.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn post_json<Req, Resp>(&self, url: &Url, body: &Req) -> GeminiResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest with retry logic.
///
/// Implements exponential backoff for transient server errors (5xx)
/// and network errors.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay: Duration,
    api_key: Option<String>,
}

impl ReqwestBackend {
    pub fn new(config: &GeminiClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
            api_key: config.api_key.clone(),
        }
    }

    fn build_request<Req: Serialize>(&self, url: &Url, body: &Req) -> reqwest::RequestBuilder {
        let mut request = self.client.post(url.as_str()).json(body);
        if let Some(ref key) = self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        request
    }

    /// POST with automatic retry for transient errors.
    async fn send_with_retry<Req: Serialize + Sync>(
        &self,
        url: &Url,
        body: &Req,
    ) -> GeminiResult<reqwest::Response> {
        let mut last_error: Option<GeminiError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.retry_base_delay, attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis(), "Retrying Gemini request");
                tokio::time::sleep(delay).await;
            }

            match self.build_request(url, body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let body = response.text().await.unwrap_or_default();
                    let error = GeminiError::ApiRequestFailed {
                        status: status.as_u16(),
                        message: api_error_message(&body),
                    };

                    // 5xx errors are retryable (server-side issues)
                    if status.is_server_error() && attempt < self.max_retries {
                        tracing::warn!(status = status.as_u16(), "Transient Gemini error");
                        last_error = Some(error);
                        continue;
                    }

                    // 4xx errors or final attempt - fail immediately
                    return Err(error);
                }
                Err(e) => {
                    // Network errors are retryable
                    if attempt < self.max_retries {
                        tracing::warn!(error = %e, "Gemini request failed, will retry");
                        last_error = Some(e.into());
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.unwrap_or(GeminiError::EmptyResponse {
            expected: "response",
        }))
    }
}

/// Delay before retry `attempt` (1-based): `base * 2^(attempt - 1)`.
fn backoff_delay(base: Duration, attempt: u8) -> Duration {
    base.saturating_mul(2u32.saturating_pow(u32::from(attempt.saturating_sub(1))))
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw
/// text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(serde_json::Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn post_json<Req, Resp>(&self, url: &Url, body: &Req) -> GeminiResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let response = self.send_with_retry(url, body).await?;
        let data: Resp = response.json().await?;
        Ok(data)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Canned response for the fake backend.
    #[derive(Clone)]
    pub struct CannedResponse {
        pub status: u16,
        pub json: serde_json::Value,
    }

    impl CannedResponse {
        pub const fn ok(json: serde_json::Value) -> Self {
            Self { status: 200, json }
        }
    }

    /// A request the fake backend received.
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub body: serde_json::Value,
    }

    /// A fake HTTP backend that returns canned responses and records every
    /// request body.
    #[derive(Default)]
    pub struct FakeBackend {
        responses: Mutex<HashMap<String, CannedResponse>>,
        pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a canned response for URLs containing `url_contains`.
        pub fn with_response(self, url_contains: &str, response: CannedResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url_contains.to_string(), response);
            self
        }

        fn find_response(&self, url: &str) -> Option<CannedResponse> {
            let responses = self.responses.lock().unwrap();
            responses
                .iter()
                .find(|(pattern, _)| url.contains(pattern.as_str()))
                .map(|(_, response)| response.clone())
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn post_json<Req, Resp>(&self, url: &Url, body: &Req) -> GeminiResult<Resp>
        where
            Req: Serialize + Sync,
            Resp: DeserializeOwned + Send,
        {
            self.requests.lock().unwrap().push(RecordedRequest {
                url: url.to_string(),
                body: serde_json::to_value(body)?,
            });

            let response =
                self.find_response(url.as_str())
                    .ok_or_else(|| GeminiError::ApiRequestFailed {
                        status: 404,
                        message: format!("no canned response for {url}"),
                    })?;

            if !(200..300).contains(&response.status) {
                return Err(GeminiError::ApiRequestFailed {
                    status: response.status,
                    message: api_error_message(&response.json.to_string()),
                });
            }
            serde_json::from_value(response.json).map_err(Into::into)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(2000));
    }

    #[test]
    fn test_api_error_message_extracts_field() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid.");
        assert_eq!(api_error_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_reqwest_backend_creation() {
        let config = GeminiClientConfig::default().with_api_key("k");
        let backend = ReqwestBackend::new(&config);
        assert_eq!(backend.max_retries, 3);
        assert_eq!(backend.retry_base_delay, Duration::from_millis(500));
        assert_eq!(backend.api_key.as_deref(), Some("k"));
    }

    mod fake_backend_tests {
        use super::super::testing::*;
        use super::*;
        use serde_json::json;

        #[tokio::test]
        async fn test_fake_backend_records_body() {
            let backend = FakeBackend::new()
                .with_response("flash", CannedResponse::ok(json!({"ok": true})));
            let url = Url::parse("https://example.com/models/flash:generateContent").unwrap();

            let reply: serde_json::Value =
                backend.post_json(&url, &json!({"q": 1})).await.unwrap();

            assert_eq!(reply["ok"], true);
            let requests = backend.requests.lock().unwrap();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].body, json!({"q": 1}));
        }

        #[tokio::test]
        async fn test_fake_backend_error_status() {
            let backend = FakeBackend::new().with_response(
                "flash",
                CannedResponse {
                    status: 429,
                    json: json!({"error": {"message": "quota"}}),
                },
            );
            let url = Url::parse("https://example.com/models/flash").unwrap();

            let result: GeminiResult<serde_json::Value> = backend.post_json(&url, &json!({})).await;
            assert!(matches!(
                result,
                Err(GeminiError::ApiRequestFailed { status: 429, ref message }) if message == "quota"
            ));
        }
    }
}
