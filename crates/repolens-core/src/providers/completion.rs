// Completion provider backed by the HTTP completion client
use async_trait::async_trait;
use repolens_api::CompletionClient;

use crate::{config::CompletionConfig, review::CompletionProvider, Error, Result};

#[async_trait]
impl CompletionProvider for CompletionClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        Ok(CompletionClient::complete(self, system, user).await?)
    }
}

/// Build a client from config, failing early when no API key is available
pub fn build_completion_client(config: &CompletionConfig) -> Result<CompletionClient> {
    let api_key = config.resolve_api_key().ok_or_else(|| {
        Error::ConfigError(
            "No completion API key. Set OPENAI_API_KEY or [completion].api_key".to_string(),
        )
    })?;

    Ok(CompletionClient::new(
        config.api_url.clone(),
        api_key,
        config.model.clone(),
        config.max_tokens,
    ))
}
