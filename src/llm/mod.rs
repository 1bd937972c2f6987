//! LLM — completion-service adapter.
//!
//! DESIGN
//! ======
//! Configured from environment variables. The `LlmClient` dispatches to
//! `OpenAI` (default) or Anthropic based on `LLM_PROVIDER`. Callers depend on
//! the `LlmChat` trait so tests can substitute a recording mock.

pub mod anthropic;
pub mod config;
pub mod openai;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
pub use types::LlmChat;
use types::{ChatResponse, LlmError, Message};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to either `OpenAI` or Anthropic.
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
}

enum LlmProvider {
    OpenAi(openai::OpenAiClient),
    Anthropic(anthropic::AnthropicClient),
}

impl LlmClient {
    /// Build an LLM client from a parsed typed config and a present credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        let inner = match config.provider {
            LlmProviderKind::OpenAi => {
                LlmProvider::OpenAi(openai::OpenAiClient::new(api_key, config.openai_base_url.clone())?)
            }
            LlmProviderKind::Anthropic => LlmProvider::Anthropic(anthropic::AnthropicClient::new(api_key)?),
        };
        Ok(Self { inner, model: config.model.clone() })
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, max_tokens: u32, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        match &self.inner {
            LlmProvider::OpenAi(c) => c.chat(&self.model, max_tokens, system, messages).await,
            LlmProvider::Anthropic(c) => c.chat(&self.model, max_tokens, system, messages).await,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}
