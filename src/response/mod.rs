//! Reply generation
//!
//! [`ResponseGenerator::generate`] always returns usable text. Backend
//! problems of any kind (no key, transport, status, body, timeout, empty
//! completion) are absorbed and answered with a canned fallback.

pub mod client;
pub mod fallback;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::classify::{Emotion, Language};
use crate::config::{Config, LlmConfig};
use crate::{Error, Result};

pub use client::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CompletionBackend, OpenAiClient,
};
pub use prompt::{Persona, build_system_prompt};

/// A generated reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseResult {
    pub text: String,
    pub is_fallback: bool,
    /// Why the backend answer was not used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub timeout: Duration,
}

impl From<&LlmConfig> for CompletionParams {
    fn from(llm: &LlmConfig) -> Self {
        Self {
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
            temperature: llm.temperature,
            top_p: llm.top_p,
            frequency_penalty: llm.frequency_penalty,
            presence_penalty: llm.presence_penalty,
            timeout: llm.timeout,
        }
    }
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

/// Produces replies tuned to language and emotion
pub struct ResponseGenerator {
    persona: Persona,
    params: CompletionParams,
    backend: Option<Arc<dyn CompletionBackend>>,
}

impl ResponseGenerator {
    /// Create a generator; `backend = None` answers every request with a fallback
    #[must_use]
    pub fn new(
        persona: Persona,
        params: CompletionParams,
        backend: Option<Arc<dyn CompletionBackend>>,
    ) -> Self {
        Self {
            persona,
            params,
            backend,
        }
    }

    /// Build a generator backed by the configured OpenAI-compatible API
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let backend = config.llm.api_key.clone().map(|key| {
            Arc::new(OpenAiClient::new(&config.llm.api_url, key)) as Arc<dyn CompletionBackend>
        });

        Self::new(
            Persona {
                name: config.assistant.name.clone(),
                description: config.assistant.description.clone(),
            },
            CompletionParams::from(&config.llm),
            backend,
        )
    }

    /// The request that would be sent for this input
    #[must_use]
    pub fn request_for(
        &self,
        language: Language,
        emotion: Emotion,
        user_text: &str,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.params.model.clone(),
            messages: vec![
                ChatMessage::system(build_system_prompt(&self.persona, language, emotion)),
                ChatMessage::user(user_text),
            ],
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            frequency_penalty: self.params.frequency_penalty,
            presence_penalty: self.params.presence_penalty,
        }
    }

    /// Generate a reply; never fails and never returns empty text
    pub async fn generate(
        &self,
        language: Language,
        emotion: Emotion,
        user_text: &str,
    ) -> ResponseResult {
        match self.complete(language, emotion, user_text).await {
            Ok(text) => {
                tracing::debug!(%language, %emotion, chars = text.len(), "reply generated");
                ResponseResult {
                    text,
                    is_fallback: false,
                    fallback_reason: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, %language, "completion failed, using fallback reply");
                ResponseResult {
                    text: fallback::pick(language).to_string(),
                    is_fallback: true,
                    fallback_reason: Some(e.to_string()),
                }
            }
        }
    }

    async fn complete(&self, language: Language, emotion: Emotion, user_text: &str) -> Result<String> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| Error::Config("no completion backend key configured".to_string()))?;

        let request = self.request_for(language, emotion, user_text);
        let text = tokio::time::timeout(self.params.timeout, backend.complete(&request))
            .await
            .map_err(|_| Error::Timeout(self.params.timeout))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Backend("empty completion".to_string()));
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct Fixed(Result<String>);

    #[async_trait]
    impl CompletionBackend for Fixed {
        async fn complete(&self, _request: &ChatCompletionRequest) -> Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(Error::Backend(e.to_string())),
            }
        }
    }

    struct Slow;

    #[async_trait]
    impl CompletionBackend for Slow {
        async fn complete(&self, _request: &ChatCompletionRequest) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn generator(backend: Option<Arc<dyn CompletionBackend>>) -> ResponseGenerator {
        ResponseGenerator::new(
            Persona {
                name: "Sahayak".to_string(),
                description: "a friend.".to_string(),
            },
            CompletionParams {
                timeout: Duration::from_millis(20),
                ..CompletionParams::default()
            },
            backend,
        )
    }

    #[tokio::test]
    async fn test_backend_reply_used() {
        let generator = generator(Some(Arc::new(Fixed(Ok("  Sab theek hoga. ".to_string())))));
        let result = generator
            .generate(Language::Hinglish, Emotion::Sad, "main udas hoon")
            .await;

        assert_eq!(result.text, "Sab theek hoga.");
        assert!(!result.is_fallback);
    }

    #[tokio::test]
    async fn test_no_key_falls_back() {
        let result = generator(None)
            .generate(Language::Hindi, Emotion::Neutral, "नमस्ते")
            .await;

        assert!(result.is_fallback);
        assert!(fallback::replies(Language::Hindi).contains(&result.text.as_str()));
        assert!(result.fallback_reason.is_some());
    }

    #[tokio::test]
    async fn test_error_and_empty_fall_back() {
        for backend in [
            Fixed(Err(Error::Backend("500".to_string()))),
            Fixed(Ok("   ".to_string())),
        ] {
            let result = generator(Some(Arc::new(backend)))
                .generate(Language::English, Emotion::Happy, "hello")
                .await;
            assert!(result.is_fallback);
            assert!(!result.text.is_empty());
        }
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let result = generator(Some(Arc::new(Slow)))
            .generate(Language::English, Emotion::Tired, "so sleepy")
            .await;

        assert!(result.is_fallback);
        assert!(result.fallback_reason.unwrap().contains("timed out"));
    }

    #[test]
    fn test_request_carries_params() {
        let request = generator(None).request_for(Language::English, Emotion::Sad, "hi");

        assert_eq!(request.model, "gpt-3.5-turbo");
        assert_eq!(request.max_tokens, 150);
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[0].content.contains(prompt::guidelines(Emotion::Sad)));
    }
}
