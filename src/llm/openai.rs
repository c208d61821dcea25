use super::prompt_builder::PromptPair;
use super::{ChatTransport, HttpReply, RequestConfig};
use crate::error::Error;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for the OpenAI-compatible Chat Completions API.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    n: u32,
    stop: Vec<String>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatRequest {
    pub fn new(config: &RequestConfig, prompts: PromptPair) -> Self {
        ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: prompts.system,
                },
                ChatMessage {
                    role: "user".into(),
                    content: prompts.user,
                },
            ],
            max_tokens: config.max_output_tokens,
            n: config.sample_count,
            stop: config.stop_sequences.clone(),
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

// Everything is optional so shape problems surface as MalformedResponse
// instead of a serde error.
#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Option<Vec<ChatChoice>>,
    pub usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatMessageResponse>,
}

#[derive(Deserialize)]
pub(crate) struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Blocking HTTP transport that posts to `{base}/v1/chat/completions`.
pub struct HttpTransport {
    client: Client,
    api_key: String,
    api_base_url: String,
}

impl HttpTransport {
    pub fn new(api_key: String, api_base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpTransport {
            client,
            api_key,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn chat_url(&self) -> String {
        if self.api_base_url.ends_with("/v1") {
            format!("{}/chat/completions", self.api_base_url)
        } else {
            format!("{}/v1/chat/completions", self.api_base_url)
        }
    }
}

impl ChatTransport for HttpTransport {
    fn send(&self, request: &ChatRequest) -> Result<HttpReply, Error> {
        let url = self.chat_url();

        log::info!("Calling model {:?} at {}", request.model(), url);

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()?;

        let status = resp.status().as_u16();
        let body = resp.text()?;

        log::debug!("Endpoint replied with HTTP {status} ({} bytes)", body.len());

        Ok(HttpReply { status, body })
    }
}
