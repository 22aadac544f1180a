//! Persona synthesis with tiered redaction enforcement.
//!
//! Pipeline: validate the hint → request synthesis → check the redaction
//! invariant → re-request once with a stronger directive → deterministic
//! local substitution → warn. Each tier is a separate step so the tests can
//! exercise them independently through a scripted model client.

use std::sync::Arc;

use tracing::{info, warn};

use crate::providers::{CompletionRequest, Message, ModelClient};

use super::prompts;
use super::redaction::{MatchStrictness, NameMatcher, DEFAULT_PLACEHOLDER};
use super::{IdentityHint, PersonaProfile, RedactionOutcome, SynthesisError, SynthesizedPersona};

/// Synthesizes redacted persona profiles from identity hints.
///
/// Stateless apart from its client handle; one synthesizer can serve any
/// number of persona-creation actions.
pub struct PersonaSynthesizer {
    client: Arc<dyn ModelClient>,
    strictness: MatchStrictness,
    placeholder: String,
}

impl PersonaSynthesizer {
    /// Create a synthesizer with default redaction settings
    /// (exact-substring matching, neutral placeholder).
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            strictness: MatchStrictness::default(),
            placeholder: DEFAULT_PLACEHOLDER.to_owned(),
        }
    }

    /// Override the name-matching strictness.
    #[must_use]
    pub fn with_strictness(mut self, strictness: MatchStrictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Override the local-redaction placeholder.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Synthesize a redacted persona profile from `hint`.
    ///
    /// Makes at most two upstream calls: one synthesis request, plus one
    /// retry with a stronger directive if the first output leaked the name.
    /// If the retry call itself fails upstream, the first output is redacted
    /// locally instead of surfacing the failure — a correctable profile in
    /// hand beats an error.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::MissingName`] before any network call when
    /// the hint's name is empty, and [`SynthesisError::Provider`] when the
    /// initial upstream call fails.
    pub async fn synthesize(
        &self,
        hint: &IdentityHint,
    ) -> Result<SynthesizedPersona, SynthesisError> {
        hint.validate()?;
        let matcher = NameMatcher::new(hint.trimmed_name(), self.strictness)?;

        let text = self.client.complete(self.request(hint, false)).await?;
        if !matcher.matches(&text) {
            return Ok(SynthesizedPersona {
                profile: PersonaProfile::new(text),
                redaction: RedactionOutcome::Clean,
            });
        }

        info!(
            model = %self.client.model_id(),
            "synthesized profile leaked the name, re-requesting with stronger directive"
        );
        let retried = match self.client.complete(self.request(hint, true)).await {
            Ok(retried) => retried,
            Err(e) => {
                warn!(error = %e, "redaction retry failed upstream, redacting first output locally");
                text
            }
        };
        if !matcher.matches(&retried) {
            return Ok(SynthesizedPersona {
                profile: PersonaProfile::new(retried),
                redaction: RedactionOutcome::CleanAfterRetry,
            });
        }

        let redacted = matcher.redact(&retried, &self.placeholder);
        if matcher.matches(&redacted) {
            // Reachable when the name itself overlaps the placeholder;
            // a non-compliant profile is never returned silently.
            warn!("name still detectable after local redaction pass");
            return Ok(SynthesizedPersona {
                profile: PersonaProfile::new(redacted),
                redaction: RedactionOutcome::Warning,
            });
        }

        info!("applied deterministic local redaction pass");
        Ok(SynthesizedPersona {
            profile: PersonaProfile::new(redacted),
            redaction: RedactionOutcome::LocallyRedacted,
        })
    }

    fn request(&self, hint: &IdentityHint, stronger: bool) -> CompletionRequest {
        let mut instructions = vec![prompts::synthesis_instructions()];
        if stronger {
            instructions.push(prompts::stronger_redaction_directive(hint.trimmed_name()));
        }
        CompletionRequest {
            instructions,
            messages: vec![Message::user(prompts::synthesis_request(hint))],
        }
    }
}
