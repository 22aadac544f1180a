//! Shared test support: a scripted in-memory model client.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use persona_sim::providers::{CompletionRequest, ModelClient, ProviderError};

/// A [`ModelClient`] that replays a fixed script of outcomes and records
/// every request it receives, so tests can assert both what was sent and
/// how many calls were made.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    /// Build a client that yields the given outcomes in order.
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Convenience: a script of plain successful replies.
    pub fn replies<S: AsRef<str>>(replies: &[S]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.as_ref().to_owned())).collect())
    }

    /// A client that must never be called.
    pub fn unreachable() -> Self {
        Self::new(Vec::new())
    }

    /// How many completion calls were made.
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    /// Snapshot of every request received, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// The nth request received.
    pub fn request(&self, n: usize) -> CompletionRequest {
        self.requests()
            .get(n)
            .cloned()
            .expect("request index out of range")
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.requests.lock().expect("requests lock").push(request);
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Parse("scripted client exhausted".to_owned())))
    }

    fn model_id(&self) -> &str {
        "scripted/test-model"
    }
}

/// A scripted upstream failure, as a 5xx status error.
pub fn server_error() -> ProviderError {
    ProviderError::HttpStatus {
        status: 500,
        body: "upstream unavailable".to_owned(),
    }
}

/// A scripted authentication failure.
pub fn auth_error() -> ProviderError {
    ProviderError::HttpStatus {
        status: 401,
        body: "invalid api key".to_owned(),
    }
}
