//! Persona synthesis: identity hints in, redacted profile documents out.
//!
//! The [`synthesizer::PersonaSynthesizer`] delegates profile generation to a
//! hosted model and then enforces the redaction invariant locally: the
//! returned [`PersonaProfile`] must not contain the literal full name from
//! the [`IdentityHint`]. Enforcement is tiered (retry upstream, then a
//! deterministic local pass) because the generator is not trusted to obey
//! the instruction reliably.

use serde::{Deserialize, Serialize};

use crate::providers::ProviderError;

pub mod prompts;
pub mod redaction;
pub mod synthesizer;

/// Section headings every synthesized profile is asked to carry.
pub const PROFILE_SECTIONS: [&str; 6] = [
    "Background",
    "Experience",
    "Interests",
    "Communication Style",
    "Personality & Behavior",
    "Constraints",
];

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Public-profile hints about a person, provided once per persona creation.
///
/// Immutable after submission; used only to build the synthesis prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityHint {
    /// The person's full name. Required, non-empty after trimming.
    pub full_name: String,
    /// LinkedIn profile URL.
    pub linkedin_url: Option<String>,
    /// X (Twitter) profile URL.
    pub x_url: Option<String>,
    /// Free-text context the caller wants emphasized.
    pub notes: Option<String>,
}

impl IdentityHint {
    /// Build a hint from just a name.
    pub fn named(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            linkedin_url: None,
            x_url: None,
            notes: None,
        }
    }

    /// The full name with surrounding whitespace removed.
    pub fn trimmed_name(&self) -> &str {
        self.full_name.trim()
    }

    /// Check the hint before any network call is made.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::MissingName`] when the full name is empty
    /// after trimming.
    pub fn validate(&self) -> Result<(), SynthesisError> {
        if self.trimmed_name().is_empty() {
            return Err(SynthesisError::MissingName);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A synthesized, redacted persona document.
///
/// Fixed-section markdown text held for the lifetime of a session. The
/// redaction invariant (no literal full name) is enforced by the
/// synthesizer before one of these is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaProfile(String);

impl PersonaProfile {
    /// Wrap profile text. Callers are expected to have run redaction
    /// enforcement first; this does not re-validate.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The profile document text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the profile carries no usable text.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for PersonaProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the redaction invariant was satisfied for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedactionOutcome {
    /// The generator obeyed the redaction directive on the first attempt.
    Clean,
    /// A second request with a stronger directive came back clean.
    CleanAfterRetry,
    /// The name survived both requests and was replaced locally.
    LocallyRedacted,
    /// The name is still detectable after every tier; the profile is
    /// returned anyway but must be surfaced with a warning, never silently.
    Warning,
}

impl RedactionOutcome {
    /// Whether the caller must show a redaction warning to the user.
    pub fn needs_warning(self) -> bool {
        matches!(self, Self::Warning)
    }
}

/// The result of a persona-creation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedPersona {
    /// The redacted profile document.
    pub profile: PersonaProfile,
    /// Which enforcement tier produced it.
    pub redaction: RedactionOutcome,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from persona synthesis.
///
/// None of these are fatal: the caller surfaces them with a retry
/// affordance and leaves session state untouched.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// The hint had no usable full name; checked before any network call.
    #[error("a non-empty full name is required to create a persona")]
    MissingName,
    /// The redaction matcher could not be compiled for this name.
    #[error("failed to compile name matcher: {0}")]
    Matcher(#[from] regex::Error),
    /// The upstream model call failed (network, auth, quota, empty output).
    #[error("persona synthesis failed: {0}")]
    Provider(#[from] ProviderError),
}
