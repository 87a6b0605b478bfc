//! AI tag suggestion contract and pure request/response helpers.
//!
//! # Responsibility
//! - Define the blocking `AiClient` seam invoked from worker threads.
//! - Build the tag prompt, parse the comma-separated reply and resolve the
//!   model id to use for one call.
//!
//! # Invariants
//! - Parsed tag names are trimmed and never blank.
//! - Model resolution never fails; it falls back to `DEFAULT_MODEL_KEY`.

use crate::settings::{AUTO_MODEL_KEY, DEFAULT_MODEL_KEY};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// AI round-trip failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// Host reported no connectivity; no call was made.
    Offline,
    /// AI mode is off or no credential is stored.
    NotConfigured,
    /// Request could not be sent or the body could not be read.
    Transport(String),
    /// Provider answered with a non-success status.
    Status { code: u16, message: String },
    /// Provider answered without any output text.
    EmptyResponse,
    /// Provider answered with a body that cannot be decoded.
    Malformed(String),
    /// Worker thread could not be started.
    Spawn(String),
    /// Client panicked on the worker thread.
    Panicked(String),
}

impl Display for AiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offline => write!(f, "Offline"),
            Self::NotConfigured => write!(f, "AI tagging is not configured"),
            Self::Transport(message) => write!(f, "request failed: {message}"),
            Self::Status { code, message } => write!(f, "HTTP {code}: {message}"),
            Self::EmptyResponse => write!(f, "empty response from AI provider"),
            Self::Malformed(message) => write!(f, "malformed AI response: {message}"),
            Self::Spawn(message) => write!(f, "failed to start AI worker: {message}"),
            Self::Panicked(message) => write!(f, "AI worker panicked: {message}"),
        }
    }
}

impl Error for AiError {}

/// Blocking AI provider client.
///
/// Implementations are called only from AI worker threads, never from the
/// owning context.
pub trait AiClient: Send + Sync {
    /// Sends `prompt` to `model` and returns the reply text.
    fn complete(&self, prompt: &str, model: &str, credential: &str) -> Result<String, AiError>;

    /// Lists model ids visible to `credential`.
    fn list_model_ids(&self, credential: &str) -> Result<Vec<String>, AiError>;
}

/// Client for hosts that never enable AI mode; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAiClient;

impl AiClient for DisabledAiClient {
    fn complete(&self, _prompt: &str, _model: &str, _credential: &str) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }

    fn list_model_ids(&self, _credential: &str) -> Result<Vec<String>, AiError> {
        Err(AiError::NotConfigured)
    }
}

/// Builds the tag suggestion prompt for one note.
pub fn build_tag_prompt(
    title: &str,
    content: &str,
    limit: usize,
    existing_tags: &[String],
) -> String {
    format!(
        "system: You are a tag suggestion assistant that outputs a comma-separated list of tag names.\n\
         Use existing tags when appropriate. Do not explain or output anything other than the tag list.\n\
         Existing tags: {}\n\
         user: Extract up to {limit} tags from the following text:\n\
         Title: {title}\n\
         Content: {content}\n",
        existing_tags.join(", ")
    )
}

/// Splits a comma-separated reply into trimmed, non-blank names.
pub fn parse_tag_csv(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_chat_model(id: &str) -> bool {
    id.starts_with("gpt-") || id.contains("chat")
}

/// Resolves the model id for one call.
///
/// `auto` lists the provider's models and picks the first chat-capable id;
/// listing failures and empty lists fall back to `DEFAULT_MODEL_KEY`.
pub fn resolve_model_id(client: &dyn AiClient, model_key: &str, credential: &str) -> String {
    let key = model_key.trim();
    if key.is_empty() {
        return DEFAULT_MODEL_KEY.to_string();
    }
    if !key.eq_ignore_ascii_case(AUTO_MODEL_KEY) {
        return key.to_string();
    }

    match client.list_model_ids(credential) {
        Ok(ids) => match ids.into_iter().find(|id| is_chat_model(id)) {
            Some(id) => {
                debug!("event=ai_model_resolve module=autotag status=ok source=listing");
                id
            }
            None => {
                debug!("event=ai_model_resolve module=autotag status=skip reason=no_chat_model");
                DEFAULT_MODEL_KEY.to_string()
            }
        },
        Err(err) => {
            warn!("event=ai_model_resolve module=autotag status=error error={err}");
            DEFAULT_MODEL_KEY.to_string()
        }
    }
}
