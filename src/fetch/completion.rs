use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FetchError, HttpFetcher};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// OpenAI-compatible chat completion client
pub struct CompletionClient {
    http: HttpFetcher,
    base_url: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    pub fn new(
        http: HttpFetcher,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Send one user prompt and return the first choice's message text.
    pub async fn complete(&self, prompt: &str) -> Result<String, FetchError> {
        if self.api_key.trim().is_empty() {
            return Err(FetchError::NotConfigured);
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("Sending completion request: {}", url);

        let response: ChatResponse = self
            .http
            .send_json(
                self.http
                    .client()
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&request),
            )
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(FetchError::Missing("completion message"))
    }
}
