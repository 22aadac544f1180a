//! Persona-grounded chat turns.
//!
//! [`PersonaChat`] produces the next assistant utterance by conditioning
//! the model on developer-level behavioral instructions, the profile
//! document, and the prior transcript in strict chronological order. It
//! owns no state — the caller's [`Session`](crate::session::Session) holds
//! the transcript.

use std::sync::Arc;

use tracing::debug;

use crate::persona::{prompts, PersonaProfile};
use crate::providers::{CompletionRequest, Message, ModelClient, ProviderError, Role};
use crate::session::{ConversationTurn, TurnRole};

/// Errors from a chat turn.
///
/// All recoverable: the surrounding UI surfaces them and lets the user
/// retry; no error here is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Chat was attempted before a persona exists. Precondition violation;
    /// checked before any network call.
    #[error("no persona exists yet — create one before chatting")]
    MissingPersona,
    /// The upstream model call failed (network, auth, quota, empty output).
    #[error("chat turn failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Produces persona-grounded assistant replies.
pub struct PersonaChat {
    client: Arc<dyn ModelClient>,
}

impl PersonaChat {
    /// Create a chat component backed by the given model client.
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Generate the next assistant turn.
    ///
    /// Context sent upstream: behavioral instructions, then the profile as
    /// grounding, then `transcript` in its given order, then `user_message`
    /// as the final item. Output content is inherently non-deterministic;
    /// only structure and grounding are fixed.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MissingPersona`] for an empty profile (no
    /// network call is made) and [`ChatError::Provider`] on upstream
    /// failure.
    pub async fn respond(
        &self,
        profile: &PersonaProfile,
        transcript: &[ConversationTurn],
        user_message: &str,
    ) -> Result<ConversationTurn, ChatError> {
        if profile.is_empty() {
            return Err(ChatError::MissingPersona);
        }

        let request = build_context(profile, transcript, user_message);
        debug!(
            model = %self.client.model_id(),
            turns = transcript.len(),
            "requesting persona reply"
        );

        let reply = self.client.complete(request).await?;
        Ok(ConversationTurn::assistant(reply))
    }
}

/// Assemble the upstream context for one chat turn.
///
/// The new user message is always the last element.
fn build_context(
    profile: &PersonaProfile,
    transcript: &[ConversationTurn],
    user_message: &str,
) -> CompletionRequest {
    let mut messages: Vec<Message> = Vec::with_capacity(transcript.len().saturating_add(1));
    for turn in transcript {
        messages.push(Message {
            role: match turn.role {
                TurnRole::User => Role::User,
                TurnRole::Assistant => Role::Assistant,
            },
            content: turn.text.clone(),
        });
    }
    messages.push(Message::user(user_message));

    CompletionRequest {
        instructions: vec![
            prompts::chat_instructions().to_owned(),
            prompts::profile_grounding(profile),
        ],
        messages,
    }
}
