//! Full-name detection and deterministic local redaction.
//!
//! The matcher is the single source of truth for "does this text still
//! contain the name" — the synthesizer's enforcement tiers and the tests
//! both go through it, so the chosen strictness is applied consistently.

use regex::Regex;

/// Neutral replacement used by the local redaction pass.
pub const DEFAULT_PLACEHOLDER: &str = "the individual";

/// Names with more tokens than this are only matched in their given order;
/// permutation matching would explode combinatorially.
const MAX_PERMUTED_TOKENS: usize = 4;

/// How strictly generated text is checked for the full name.
///
/// Nicknames and initials are deliberately not matched — they cannot be
/// derived reliably from the hint and false positives would mangle
/// unrelated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrictness {
    /// Case-insensitive match of the name tokens in their given order,
    /// tolerant of whitespace runs between tokens. The default.
    #[default]
    ExactSubstring,
    /// Additionally matches permutations of the name tokens
    /// ("Rivers Jordan Alex"), up to four-token names.
    NameTokens,
}

/// Detects and removes occurrences of a full name in generated text.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    patterns: Vec<Regex>,
}

impl NameMatcher {
    /// Compile matcher patterns for `full_name` at the given strictness.
    ///
    /// # Errors
    ///
    /// Returns a `regex::Error` if a pattern fails to compile; with escaped
    /// input this indicates a pathological name (e.g. one exceeding the
    /// regex size limit).
    pub fn new(full_name: &str, strictness: MatchStrictness) -> Result<Self, regex::Error> {
        let tokens: Vec<&str> = full_name.split_whitespace().collect();

        let orderings: Vec<Vec<&str>> = match strictness {
            MatchStrictness::ExactSubstring => vec![tokens],
            MatchStrictness::NameTokens => {
                if tokens.len() >= 2 && tokens.len() <= MAX_PERMUTED_TOKENS {
                    permutations(&tokens)
                } else {
                    vec![tokens]
                }
            }
        };

        let mut patterns = Vec::with_capacity(orderings.len());
        for ordering in orderings {
            if ordering.is_empty() {
                continue;
            }
            let escaped: Vec<String> = ordering.iter().map(|t| regex::escape(t)).collect();
            patterns.push(Regex::new(&format!(r"(?i){}", escaped.join(r"\s+")))?);
        }

        Ok(Self { patterns })
    }

    /// Whether the text still contains the name under this strictness.
    ///
    /// Always `false` for a matcher built from a blank name.
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    /// Replace every occurrence of the name with `placeholder`.
    ///
    /// Deterministic: the same input always yields the same output, and the
    /// output no longer matches under the same strictness.
    pub fn redact(&self, text: &str, placeholder: &str) -> String {
        let mut result = text.to_owned();
        for pattern in &self.patterns {
            result = pattern.replace_all(&result, placeholder).into_owned();
        }
        result
    }
}

/// All orderings of `items`. Input length is capped by the caller.
fn permutations<'a>(items: &[&'a str]) -> Vec<Vec<&'a str>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut result = Vec::new();
    for (i, head) in items.iter().enumerate() {
        let mut rest: Vec<&str> = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            result.push(tail);
        }
    }
    result
}
