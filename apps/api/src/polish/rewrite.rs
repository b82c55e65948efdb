use async_trait::async_trait;
use thiserror::Error;

use crate::llm_client::{LlmClient, MODEL};
use crate::polish::prompts::{build_polish_prompt, POLISH_SYSTEM};

/// Outcome of a successful rewrite.
#[derive(Debug, Clone)]
pub struct Rewritten {
    pub text: String,
    pub model: String,
    pub tokens_used: Option<i32>,
}

#[derive(Debug, Error)]
pub enum RewriteError {
    /// The backend could not produce a result (timeout, upstream error,
    /// empty response). An unmodified echo of the input is never returned
    /// in its place.
    #[error("rewrite backend unavailable: {0}")]
    Unavailable(String),
}

/// Seam between the polish orchestrator and the model backend.
#[async_trait]
pub trait RewriteEngine: Send + Sync {
    async fn rewrite(
        &self,
        content: &str,
        instruction: Option<&str>,
    ) -> Result<Rewritten, RewriteError>;
}

/// Production engine backed by the shared LLM client.
pub struct LlmRewriter {
    client: LlmClient,
}

impl LlmRewriter {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RewriteEngine for LlmRewriter {
    async fn rewrite(
        &self,
        content: &str,
        instruction: Option<&str>,
    ) -> Result<Rewritten, RewriteError> {
        let prompt = build_polish_prompt(content, instruction);
        let response = self
            .client
            .call(&prompt, POLISH_SYSTEM)
            .await
            .map_err(|e| RewriteError::Unavailable(e.to_string()))?;

        let text = response
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RewriteError::Unavailable("model returned no text".to_string()))?;

        let tokens = response.usage.input_tokens + response.usage.output_tokens;
        Ok(Rewritten {
            text: text.to_string(),
            model: MODEL.to_string(),
            tokens_used: Some(tokens as i32),
        })
    }
}
