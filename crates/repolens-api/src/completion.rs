// Chat-style completion client (OpenAI-compatible endpoint)
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o";

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Completion API error ({status}): {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Malformed completion response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Empty completion response")]
    Empty,
}

pub type Result<T> = std::result::Result<T, CompletionError>;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageContent,
}

#[derive(Debug, Deserialize)]
struct ChatMessageContent {
    #[serde(default)]
    content: Option<String>,
}

pub struct CompletionClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn new(api_url: String, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system + user exchange and return the first choice's text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        debug!("POST {} (model {})", self.api_url, self.model);

        let response = self
            .client
            .post(&self.api_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::RequestFailed { status, body });
        }

        let body = response.text().await?;
        extract_text(&body)
    }
}

fn extract_text(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(CompletionError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"def f():\n    pass"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "def f():\n    pass");
    }

    #[test]
    fn test_extract_without_choices_is_empty() {
        assert!(matches!(
            extract_text(r#"{"choices":[]}"#),
            Err(CompletionError::Empty)
        ));
        assert!(matches!(
            extract_text(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(CompletionError::Empty)
        ));
    }

    #[test]
    fn test_extract_garbage_is_malformed() {
        assert!(matches!(
            extract_text("<html>bad gateway</html>"),
            Err(CompletionError::Malformed(_))
        ));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o",
            max_tokens: 16,
            messages: vec![ChatMessage {
                role: "system",
                content: "be brief",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let client = CompletionClient::new(
            "http://127.0.0.1:1/v1/chat/completions".into(),
            "sk-test".into(),
            DEFAULT_COMPLETION_MODEL.into(),
            16,
        );
        let result = client.complete("system", "user").await;
        assert!(matches!(result, Err(CompletionError::NetworkError(_))));
    }
}
