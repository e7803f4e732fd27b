use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, StructuredOutputFormat};
use serde_json::Value;

use optimizer_core::AiSettings;

use crate::schema::{SCHEMA_NAME, TEMPERATURE};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("AI provider is not configured (missing model or API key)")]
    MissingCredential,
    #[error("invalid response schema: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("build LLM: {0}")]
    Build(String),
    #[error("chat: {0}")]
    Chat(String),
    #[error("LLM returned empty text")]
    EmptyResponse,
}

/// A remote text generator that can be constrained to a JSON schema.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        instruction: &str,
        message: &str,
        schema: &Value,
    ) -> Result<String, GenerateError>;
}

fn map_backend(provider: &str) -> Result<LLMBackend, GenerateError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(GenerateError::UnknownProvider(other.to_string())),
    }
}

/// Generator backed by the `llm` crate.
///
/// Without fixed settings, the stored settings (plus the `API_KEY`
/// override) are resolved on every call.
#[derive(Debug, Clone, Default)]
pub struct LlmGenerator {
    settings: Option<AiSettings>,
}

impl LlmGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AiSettings) -> Self {
        Self {
            settings: Some(settings),
        }
    }

    fn settings(&self) -> AiSettings {
        self.settings
            .clone()
            .unwrap_or_else(optimizer_core::resolve_settings)
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(
        &self,
        instruction: &str,
        message: &str,
        schema: &Value,
    ) -> Result<String, GenerateError> {
        let settings = self.settings();
        if !optimizer_core::ai_configured(&settings) {
            return Err(GenerateError::MissingCredential);
        }
        let backend = map_backend(&settings.provider)?;

        let format: StructuredOutputFormat = serde_json::from_value(serde_json::json!({
            "name": SCHEMA_NAME,
            "schema": schema,
        }))?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&settings.model)
            .temperature(TEMPERATURE)
            .system(instruction)
            .schema(format);

        if !settings.api_key.is_empty() {
            builder = builder.api_key(&settings.api_key);
        }

        let llm = builder
            .build()
            .map_err(|e| GenerateError::Build(e.to_string()))?;

        let messages = vec![ChatMessage::user().content(message).build()];

        tracing::debug!(
            provider = %settings.provider,
            model = %settings.model,
            message_len = message.len(),
            "sending generation request"
        );
        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| GenerateError::Chat(e.to_string()))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(GenerateError::EmptyResponse),
        }
    }
}
