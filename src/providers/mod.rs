//! Hosted model client abstraction.
//!
//! Defines the [`ModelClient`] trait and the shared request types used to
//! talk to a text-generation service. One client is implemented:
//! [`openai::OpenAiClient`] — OpenAI `/v1/responses` API.
//!
//! Callers build a [`CompletionRequest`] from developer-level instruction
//! blocks plus the conversation so far; the client returns the generated
//! text or a [`ProviderError`].

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod openai;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Conversation participant role as understood by the model service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Developer-level instruction (system prompt equivalent).
    Developer,
    /// Human user message.
    User,
    /// Assistant (model) message.
    Assistant,
}

/// A single message in the context sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author.
    pub role: Role,
    /// Plain text content.
    pub content: String,
}

impl Message {
    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A request for one text completion.
///
/// Instruction blocks are forwarded as developer-role items ahead of the
/// conversation; `messages` must already be in chronological order and the
/// client sends them unchanged.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Developer-level instruction blocks, sent before the conversation.
    pub instructions: Vec<String>,
    /// Conversation messages in chronological order.
    pub messages: Vec<Message>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by model clients.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure (connect, timeout, TLS).
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match the expected schema.
    #[error("model response parse error: {0}")]
    Parse(String),
    /// Upstream service responded with an error status.
    #[error("model service returned status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// The service replied successfully but produced no text.
    #[error("model returned an empty completion")]
    Empty,
}

impl ProviderError {
    /// Whether a single retry is worth attempting.
    ///
    /// Transport failures and 5xx responses are considered transient.
    /// Authentication (401/403) and quota (429) errors are never retried —
    /// resubmitting the same credentials or hitting the same quota again
    /// cannot succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::Parse(_) | Self::Empty => false,
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure,
/// `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Mask credential-shaped substrings and cap the length of an error body.
///
/// Error bodies are surfaced inline to the user and written to logs; they
/// must not leak API keys that some gateways echo back in error payloads.
pub fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"sk-proj-[A-Za-z0-9_\-]{10,}",
        r"sk-[A-Za-z0-9_\-]{20,}",
        r"Bearer [A-Za-z0-9_\-.]{16,}",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Core model client interface.
///
/// Implementations must be `Send + Sync` so the same client can back both
/// the persona synthesizer and the chat component.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Request one text completion.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API, network, or parse failure, or when
    /// the service produced no text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    /// The model identifier this client is instantiated for.
    fn model_id(&self) -> &str;
}
