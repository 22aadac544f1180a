//! OpenAI client implementation using the `/v1/responses` API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{check_http_response, CompletionRequest, ModelClient, ProviderError, Role};

const RESPONSES_PATH: &str = "/v1/responses";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// OpenAI Responses API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ResponsesRequest {
    /// Model identifier.
    pub model: String,
    /// Input items: developer instructions followed by the conversation.
    pub input: Vec<InputItem>,
    /// Reasoning-effort hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Reasoning>,
}

/// A single input item in OpenAI Responses format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct InputItem {
    /// Role (`developer`, `user`, `assistant`).
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// Reasoning configuration.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct Reasoning {
    /// Effort hint (`low`, `medium`, `high`).
    pub effort: String,
}

/// OpenAI Responses API response body.
///
/// Only the fields this crate consumes are modelled; the API returns many
/// more (ids, timing, tool state) which serde ignores.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ResponsesResponse {
    /// Output items (reasoning traces, messages, tool calls).
    pub output: Vec<OutputItem>,
    /// Token usage.
    pub usage: Option<ResponsesUsage>,
}

/// A single output item.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OutputItem {
    /// Item type (`message`, `reasoning`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Content blocks, present on `message` items.
    #[serde(default)]
    pub content: Vec<OutputContent>,
}

/// A content block within a message output item.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OutputContent {
    /// Block type (`output_text`, `refusal`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Text payload for `output_text` blocks.
    #[serde(default)]
    pub text: String,
}

/// OpenAI usage statistics.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ResponsesUsage {
    /// Input token count.
    pub input_tokens: Option<u32>,
    /// Output token count.
    pub output_tokens: Option<u32>,
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build a Responses API request from a completion request.
///
/// Instruction blocks become leading `developer` items; conversation
/// messages follow in their given (chronological) order.
#[doc(hidden)]
pub fn build_request(
    model: &str,
    reasoning_effort: Option<&str>,
    request: &CompletionRequest,
) -> ResponsesRequest {
    let mut input: Vec<InputItem> = Vec::new();

    for instruction in &request.instructions {
        input.push(InputItem {
            role: "developer".to_owned(),
            content: instruction.clone(),
        });
    }

    for msg in &request.messages {
        input.push(InputItem {
            role: role_to_openai(msg.role).to_owned(),
            content: msg.content.clone(),
        });
    }

    ResponsesRequest {
        model: model.to_owned(),
        input,
        reasoning: reasoning_effort.map(|effort| Reasoning {
            effort: effort.to_owned(),
        }),
    }
}

/// Parse a Responses API body into the generated output text.
///
/// Concatenates the `output_text` blocks of all `message` output items,
/// skipping reasoning traces and other item types.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body cannot be deserialized and
/// `ProviderError::Empty` if no non-blank output text is present.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let resp: ResponsesResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    if let Some(usage) = &resp.usage {
        debug!(
            input_tokens = usage.input_tokens.unwrap_or(0),
            output_tokens = usage.output_tokens.unwrap_or(0),
            "completion usage"
        );
    }

    let mut texts: Vec<&str> = Vec::new();
    for item in &resp.output {
        if item.kind != "message" {
            continue;
        }
        for block in &item.content {
            if block.kind == "output_text" && !block.text.trim().is_empty() {
                texts.push(&block.text);
            }
        }
    }

    if texts.is_empty() {
        return Err(ProviderError::Empty);
    }

    Ok(texts.join("\n"))
}

fn role_to_openai(role: Role) -> &'static str {
    match role {
        Role::Developer => "developer",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// OpenAI Responses API client.
///
/// Applies a request timeout at the HTTP layer and retries once on
/// transient failure (transport errors and 5xx) when configured to.
/// Authentication and quota errors are never retried.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    model: String,
    reasoning_effort: Option<String>,
    api_key: String,
    retry_transient: bool,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("reasoning_effort", &self.reasoning_effort)
            .field("api_key", &"__REDACTED__")
            .field("retry_transient", &self.retry_transient)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Request` if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        reasoning_effort: Option<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        retry_transient: bool,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            model: model.into(),
            reasoning_effort,
            api_key: api_key.into(),
            retry_transient,
            client,
        })
    }

    async fn send_once(&self, api_request: &ResponsesRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}{RESPONSES_PATH}", self.base_url))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }
}

#[async_trait::async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let api_request = build_request(&self.model, self.reasoning_effort.as_deref(), &request);
        debug!(model = %self.model, items = api_request.input.len(), "sending completion request");

        match self.send_once(&api_request).await {
            Ok(text) => Ok(text),
            Err(first) if self.retry_transient && first.is_transient() => {
                warn!(error = %first, "transient model failure, retrying once");
                self.send_once(&api_request).await
            }
            Err(e) => Err(e),
        }
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
