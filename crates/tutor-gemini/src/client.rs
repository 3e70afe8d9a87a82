//! Gemini client for reply generation and speech synthesis.

use tutor_core::{UserGoals, VoicePersona};
use url::Url;

use crate::config::GeminiClientConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    PrebuiltVoiceConfig, SpeechConfig, VoiceConfig,
};
use crate::prompt::system_instruction;

/// Default Gemini client using the reqwest HTTP backend.
pub type DefaultGeminiClient = GeminiClient<ReqwestBackend>;

/// Client for the Gemini `generateContent` API.
///
/// Generic over an HTTP backend for testing. Use [`DefaultGeminiClient`] in
/// production and talk to it through the core ports.
pub struct GeminiClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) config: GeminiClientConfig,
}

impl DefaultGeminiClient {
    pub fn new(config: &GeminiClientConfig) -> Self {
        Self {
            backend: ReqwestBackend::new(config),
            config: config.clone(),
        }
    }
}

impl<B: HttpBackend> GeminiClient<B> {
    /// Create a client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(config: GeminiClientConfig, backend: B) -> Self {
        Self { backend, config }
    }

    fn endpoint(&self, model: &str) -> GeminiResult<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/models/{model}:generateContent"))?)
    }

    fn ensure_key(&self) -> GeminiResult<()> {
        if self.config.api_key.is_none() {
            return Err(GeminiError::MissingApiKey);
        }
        Ok(())
    }

    /// Generate a tutor reply for `prompt`.
    pub async fn generate_text(&self, prompt: &str, goals: &UserGoals) -> GeminiResult<String> {
        self.ensure_key()?;
        let url = self.endpoint(&self.config.text_model)?;
        let request = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), prompt)],
            system_instruction: Some(Content::text(None, system_instruction(goals))),
            generation_config: None,
        };

        tracing::debug!(model = %self.config.text_model, chars = prompt.len(), "Requesting reply");
        let response: GenerateContentResponse = self.backend.post_json(&url, &request).await?;
        response
            .text()
            .ok_or(GeminiError::EmptyResponse { expected: "text" })
    }

    /// Synthesize `text` and return the base64 PCM payload.
    pub async fn synthesize_speech(&self, text: &str, voice: VoicePersona) -> GeminiResult<String> {
        self.ensure_key()?;
        let url = self.endpoint(&self.config.speech_model)?;
        let request = GenerateContentRequest {
            contents: vec![Content::text(None, text)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.as_str().to_string(),
                        },
                    },
                }),
            }),
        };

        tracing::debug!(model = %self.config.speech_model, %voice, chars = text.len(), "Requesting speech");
        let response: GenerateContentResponse = self.backend.post_json(&url, &request).await?;
        response
            .inline_audio()
            .map(str::to_string)
            .ok_or(GeminiError::EmptyResponse {
                expected: "audio data",
            })
    }
}
