//! Per-session state: the active persona and the conversation transcript.
//!
//! A [`Session`] is an explicitly passed state object, not ambient global
//! state, so multiple sessions stay isolated and testable. Nothing here
//! persists across process restarts.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatError, PersonaChat};
use crate::persona::synthesizer::PersonaSynthesizer;
use crate::persona::{IdentityHint, PersonaProfile, RedactionOutcome, SynthesisError};

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The human user.
    User,
    /// The simulated persona.
    Assistant,
}

/// One turn in the conversation, in chronological append order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who authored the turn.
    pub role: TurnRole,
    /// The turn text.
    pub text: String,
}

impl ConversationTurn {
    /// Build a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// Build an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// State for one interactive session: at most one active persona profile
/// plus the ordered transcript.
///
/// Lifecycle: starts empty; populated by [`create_persona`]; extended by
/// [`send_message`]; reset when a new persona is created or the session
/// ends. A failed synthesis or chat turn never corrupts existing state.
///
/// [`create_persona`]: Session::create_persona
/// [`send_message`]: Session::send_message
#[derive(Debug, Default)]
pub struct Session {
    profile: Option<PersonaProfile>,
    persona_label: Option<String>,
    transcript: Vec<ConversationTurn>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active persona profile, if one has been created.
    pub fn profile(&self) -> Option<&PersonaProfile> {
        self.profile.as_ref()
    }

    /// Display label for the active persona (the name as entered).
    ///
    /// UI-only; the label never flows into prompts or the profile.
    pub fn persona_label(&self) -> Option<&str> {
        self.persona_label.as_deref()
    }

    /// The transcript in chronological order.
    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    /// Synthesize a persona from `hint` and install it as the active one.
    ///
    /// On success the previous profile (if any) is overwritten and the
    /// transcript is cleared. On failure the session is left exactly as it
    /// was — no partial profile is ever stored.
    ///
    /// # Errors
    ///
    /// Propagates [`SynthesisError`] from the synthesizer.
    pub async fn create_persona(
        &mut self,
        synthesizer: &PersonaSynthesizer,
        hint: &IdentityHint,
    ) -> Result<RedactionOutcome, SynthesisError> {
        let synthesized = synthesizer.synthesize(hint).await?;

        self.profile = Some(synthesized.profile);
        self.persona_label = Some(hint.trimmed_name().to_owned());
        self.transcript.clear();
        Ok(synthesized.redaction)
    }

    /// Send a user message to the active persona and append the reply.
    ///
    /// The user turn is appended before the upstream call and stays in the
    /// transcript even if the call fails, so the user can retry by
    /// resubmitting; an assistant turn is appended only on success.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MissingPersona`] — without touching the
    /// transcript or the network — when no persona exists, and propagates
    /// upstream [`ChatError`]s otherwise.
    pub async fn send_message(
        &mut self,
        chat: &PersonaChat,
        text: impl Into<String>,
    ) -> Result<ConversationTurn, ChatError> {
        let Some(profile) = self.profile.as_ref() else {
            return Err(ChatError::MissingPersona);
        };

        let text = text.into();
        let reply = chat.respond(profile, &self.transcript, &text).await;
        self.transcript.push(ConversationTurn::user(text));
        let reply = reply?;
        self.transcript.push(reply.clone());
        Ok(reply)
    }
}
