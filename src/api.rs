use reqwest::Client;
use anyhow::{Result, anyhow};

use crate::protocol::{ChatError, ChatRequest, ChatResponse};

/// Client for the chat proxy. One call per submission; any failure is
/// surfaced as an error and collapses into the fixed apology in the UI.
#[derive(Clone)]
pub struct MentorApi {
    client: Client,
    base_url: String,
}

impl MentorApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn chat(&self, message: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let request = ChatRequest {
            message: message.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The server's coarse error only feeds the log line; the UI
            // shows the apology regardless.
            let reason = response
                .json::<ChatError>()
                .await
                .map(|e| e.error)
                .unwrap_or_default();
            return Err(anyhow!("chat request failed with {status}: {reason}"));
        }

        let chat: ChatResponse = response.json().await?;
        Ok(chat.response)
    }
}
