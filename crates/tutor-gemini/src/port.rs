//! Port trait implementations for `GeminiClient`.
//!
//! Implements the core-owned `GenerationPort` and `SynthesisPort` traits,
//! converting internal `GeminiError`s at the boundary.

use async_trait::async_trait;
use tutor_core::{
    GenerationError, GenerationPort, SynthesisError, SynthesisPort, UserGoals, VoicePersona,
};

use crate::client::GeminiClient;
use crate::error::GeminiError;
use crate::http::HttpBackend;

// ============================================================================
// Error Mapping
// ============================================================================

/// Port-neutral shape shared by both port error enums.
enum Failure {
    MissingCredential,
    Network(String),
    Api { status: u16, message: String },
    Empty,
}

fn classify(err: GeminiError) -> Failure {
    match err {
        GeminiError::MissingApiKey => Failure::MissingCredential,
        GeminiError::ApiRequestFailed { status, message } => Failure::Api { status, message },
        GeminiError::EmptyResponse { .. } => Failure::Empty,
        GeminiError::Network(e) => Failure::Network(e.to_string()),
        GeminiError::InvalidUrl(e) => Failure::Network(format!("invalid endpoint URL: {e}")),
        GeminiError::JsonParse(e) => Failure::Network(format!("malformed response: {e}")),
    }
}

fn to_generation_error(err: GeminiError) -> GenerationError {
    match classify(err) {
        Failure::MissingCredential => GenerationError::MissingCredential,
        Failure::Network(message) => GenerationError::Network { message },
        Failure::Api { status, message } => GenerationError::Api { status, message },
        Failure::Empty => GenerationError::EmptyResult,
    }
}

fn to_synthesis_error(err: GeminiError) -> SynthesisError {
    match classify(err) {
        Failure::MissingCredential => SynthesisError::MissingCredential,
        Failure::Network(message) => SynthesisError::Network { message },
        Failure::Api { status, message } => SynthesisError::Api { status, message },
        Failure::Empty => SynthesisError::EmptyResult,
    }
}

// ============================================================================
// Port Implementations
// ============================================================================

#[async_trait]
impl<B: HttpBackend + Send + Sync> GenerationPort for GeminiClient<B> {
    async fn generate(&self, prompt: &str, goals: &UserGoals) -> Result<String, GenerationError> {
        self.generate_text(prompt, goals)
            .await
            .map_err(to_generation_error)
    }
}

#[async_trait]
impl<B: HttpBackend + Send + Sync> SynthesisPort for GeminiClient<B> {
    async fn synthesize(&self, text: &str, voice: VoicePersona) -> Result<String, SynthesisError> {
        self.synthesize_speech(text, voice)
            .await
            .map_err(to_synthesis_error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::GeminiClientConfig;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use serde_json::json;

    #[test]
    fn test_map_missing_key() {
        assert_eq!(
            to_generation_error(GeminiError::MissingApiKey),
            GenerationError::MissingCredential
        );
        assert_eq!(
            to_synthesis_error(GeminiError::MissingApiKey).to_string(),
            "API key is missing"
        );
    }

    #[test]
    fn test_map_api_status() {
        let err = GeminiError::ApiRequestFailed {
            status: 503,
            message: "overloaded".into(),
        };
        assert_eq!(
            to_synthesis_error(err),
            SynthesisError::Api {
                status: 503,
                message: "overloaded".into()
            }
        );
    }

    #[test]
    fn test_map_empty() {
        let err = GeminiError::EmptyResponse { expected: "text" };
        assert_eq!(to_generation_error(err), GenerationError::EmptyResult);
    }

    #[test]
    fn test_client_as_port_objects() {
        let backend = FakeBackend::new().with_response(
            "flash",
            CannedResponse::ok(json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })),
        );
        let client = Arc::new(GeminiClient::with_backend(
            GeminiClientConfig::new().with_api_key("k"),
            backend,
        ));
        let generator: Arc<dyn GenerationPort> = client.clone();
        let _synth: Arc<dyn SynthesisPort> = client;

        let reply = tokio_test::block_on(generator.generate("hi", &UserGoals::default()));
        assert_eq!(reply.unwrap(), "ok");
    }
}
