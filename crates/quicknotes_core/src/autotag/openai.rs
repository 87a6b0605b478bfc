//! OpenAI-compatible HTTP client for tag suggestions.
//!
//! Uses the Responses endpoint for completions and the Models endpoint for
//! `auto` model discovery. Blocking; only ever called from AI worker threads.

use super::ai::{AiClient, AiError};
use log::debug;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// `AiClient` backed by an OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new() -> Result<Self, AiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Targets a compatible server, for example a local proxy.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, AiError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AiError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base_url)
    }
}

impl AiClient for OpenAiClient {
    fn complete(&self, prompt: &str, model: &str, credential: &str) -> Result<String, AiError> {
        let response = self
            .http
            .post(self.endpoint("responses"))
            .bearer_auth(credential)
            .json(&ResponsesRequest {
                model,
                input: prompt,
            })
            .send()
            .map_err(|err| AiError::Transport(err.to_string()))?;
        let body = read_success_body(response)?;
        let reply: ResponsesReply =
            serde_json::from_str(&body).map_err(|err| AiError::Malformed(err.to_string()))?;
        let text = extract_output_text(&reply);
        debug!(
            "event=ai_complete module=autotag status=ok chars={}",
            text.chars().count()
        );
        if text.is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }

    fn list_model_ids(&self, credential: &str) -> Result<Vec<String>, AiError> {
        let response = self
            .http
            .get(self.endpoint("models"))
            .bearer_auth(credential)
            .send()
            .map_err(|err| AiError::Transport(err.to_string()))?;
        let body = read_success_body(response)?;
        let list: ModelList =
            serde_json::from_str(&body).map_err(|err| AiError::Malformed(err.to_string()))?;
        Ok(list.data.into_iter().map(|entry| entry.id).collect())
    }
}

fn read_success_body(response: Response) -> Result<String, AiError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| AiError::Transport(err.to_string()))?;
    if status.is_success() {
        return Ok(body);
    }
    Err(AiError::Status {
        code: status.as_u16(),
        message: error_message(&body),
    })
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorReply>(body) {
        Ok(reply) => reply.error.message,
        Err(_) => body.trim().chars().take(200).collect(),
    }
}

/// Text of the first message item, output text parts concatenated.
fn extract_output_text(reply: &ResponsesReply) -> String {
    reply
        .output
        .iter()
        .find(|item| item.kind == "message")
        .map(|item| {
            item.content
                .iter()
                .filter(|part| part.kind == "output_text")
                .map(|part| part.text.as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}
