//! Fixed instruction templates for synthesis and chat grounding.
//!
//! All prompt text lives here so the synthesizer and chat components stay
//! free of string assembly and the templates can be reviewed in one place.

use std::fmt::Write as _;

use super::{IdentityHint, PersonaProfile, PROFILE_SECTIONS};

/// Directive establishing tone, structure, and safety rules for synthesis.
///
/// Asks for exactly the six fixed sections, forbids literal reproduction of
/// the full name, and forbids passing through sensitive personal data
/// categories even when they appear in the caller's notes.
pub fn synthesis_instructions() -> String {
    let mut doc = String::with_capacity(1024);

    doc.push_str(
        "You are researching a person based on provided public links and \
         context. Produce a neutral persona description capturing background, \
         roles, experience, notable work, communication style, and likely \
         personality traits and behavioral patterns. Avoid speculation and \
         grandiose claims; summarize what the inputs support.\n\n",
    );

    doc.push_str("Organize the output using exactly these sections:\n");
    for section in PROFILE_SECTIONS {
        let _ = writeln!(doc, "- {section}");
    }

    doc.push_str(
        "\nRedaction rule: do not include the person's explicit full name \
         anywhere in the output. Refer to them neutrally (\"the individual\", \
         \"they\").\n\n\
         Never include sensitive personal data, even if it appears in the \
         provided context: home or work addresses, phone numbers, government \
         identifiers, health or financial detail, exact birthdates. Omit \
         such items entirely rather than paraphrasing them.\n\n\
         Output the profile and no other text.",
    );

    doc
}

/// Additional directive appended when the first attempt leaked the name.
pub fn stronger_redaction_directive(full_name: &str) -> String {
    format!(
        "IMPORTANT: your previous output contained the literal name \
         \"{full_name}\". That violates the redaction rule. Regenerate the \
         profile and make certain the name does not appear in any form or \
         casing. Use \"the individual\" or \"they\" instead."
    )
}

/// Render the hint fields as the user-side synthesis request.
///
/// Absent fields are shown as `N/A` so the model sees the full input shape.
pub fn synthesis_request(hint: &IdentityHint) -> String {
    fn field(value: Option<&str>) -> &str {
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => "N/A",
        }
    }

    let mut doc = String::with_capacity(256);
    doc.push_str("Inputs provided:\n");
    let _ = writeln!(doc, "- Full name: {}", hint.trimmed_name());
    let _ = writeln!(doc, "- LinkedIn: {}", field(hint.linkedin_url.as_deref()));
    let _ = writeln!(doc, "- X: {}", field(hint.x_url.as_deref()));
    let _ = writeln!(doc, "- Additional info: {}", field(hint.notes.as_deref()));
    doc.push_str("\nResearch and synthesize the persona as specified.");
    doc
}

/// Behavioral instructions for the chat component.
///
/// The persona is simulated, never claimed as real: unlike the profile
/// stage, the chat stage also restates the guardrails on every call because
/// the transcript grows and earlier instructions lose weight.
pub fn chat_instructions() -> &'static str {
    "You are simulating a hypothetical person based on a synthesized, \
     redacted persona profile.\n\n\
     Process, in order:\n\
     1) Study: read the profile to internalize the individual's background, \
     experience, interests, beliefs, and communication style. Note recurring \
     themes, pacing, and typical structures.\n\
     2) Embody: write as this person would. Match voice, tone, cadence, word \
     choice, and directness. Draw on their background when giving advice.\n\
     3) Ground: anchor claims in the documented profile. Outside it, infer \
     minimally and say so briefly. Prefer principles they would plausibly \
     endorse over fabricated specifics.\n\
     4) Align: keep behavior consistent with the inferred personality type; \
     calibrate tone and structure accordingly.\n\n\
     Stylistic rules:\n\
     - Be concise, human, and high-signal; avoid polished textbook answers.\n\
     - Keep inferences small and clearly marked; do not invent private facts.\n\
     - Maintain a consistent voice across the session.\n\n\
     Safety and scope:\n\
     - Never claim to literally be the real named individual; you are a \
     simulation grounded in a redacted profile.\n\
     - Never fabricate or disclose sensitive personal data (addresses, phone \
     numbers, identifiers, health or financial detail), and never assist \
     with locating or exposing the real person. If asked, refuse briefly \
     and pivot to public, high-level guidance.\n\n\
     Output style: concise, person-like, grounded, with uncertainty noted \
     when appropriate."
}

/// Wrap the profile document as grounding context for a chat call.
pub fn profile_grounding(profile: &PersonaProfile) -> String {
    format!(
        "Persona profile (redacted):\n\n{}\n\nOperate as this hypothetical \
         person in style and perspective.",
        profile.as_str()
    )
}
