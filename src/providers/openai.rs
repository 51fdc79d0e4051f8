use anyhow::{Context, Result, anyhow};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RuntimeSettings;
use crate::model::Message;
use crate::providers::http_errors::request_error;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// A missing or null list reads as empty.
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

impl ChatRequest {
    pub fn single_prompt(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage::from(&Message::user(prompt))],
        }
    }
}

/// Appends the completions path verbatim; the base URL is not normalized.
pub fn chat_completions_url(base_url: &str) -> String {
    format!("{}{}", base_url, CHAT_COMPLETIONS_PATH)
}

/// Issues one chat-completion request per call. Holds no state between calls.
pub struct ChatCompletions<'a> {
    client: &'a Client,
    timeout: Option<Duration>,
}

impl<'a> ChatCompletions<'a> {
    pub fn new(client: &'a Client, settings: &RuntimeSettings) -> Self {
        Self {
            client,
            timeout: settings.request_timeout(),
        }
    }

    pub async fn execute_query(
        &self,
        base_url: &str,
        model: &str,
        api_key: &str,
        prompt: &str,
    ) -> Result<String> {
        let api_url = chat_completions_url(base_url);
        let body = serde_json::to_vec(&ChatRequest::single_prompt(model, prompt))
            .context("failed to marshal request")?;
        debug!(
            api_url = %api_url,
            model = %model,
            prompt_len = prompt.len(),
            "sending chat completion request"
        );

        let mut request = self
            .client
            .post(&api_url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %model,
                error = %err,
                "chat completion request failed"
            );
            request_error(err, &api_url, self.timeout.map(|t| t.as_secs()))
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            let response_body = response.text().await.unwrap_or_default();
            warn!(
                api_url = %api_url,
                model = %model,
                status = %status,
                response_body_len = response_body.len(),
                "chat completion API returned non-200 status"
            );
            return Err(anyhow!(
                "API returned status {}: {}",
                status.as_u16(),
                response_body
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("failed to decode response")?;
        let Some(first) = parsed.choices.unwrap_or_default().into_iter().next() else {
            warn!(api_url = %api_url, model = %model, "chat completion returned no choices");
            return Err(anyhow!("no choices in response"));
        };

        debug!(
            model = %model,
            role = %first.message.role,
            response_len = first.message.content.len(),
            "received chat completion response"
        );
        Ok(first.message.content)
    }
}
