//! Configuration loading and management.
//!
//! Loads configuration from `./config.toml` (or `$PERSONA_CONFIG_PATH`).
//! Environment variables override file values; file values override
//! defaults. The OpenAI env names (`OPENAI_API_KEY`, `OPENAI_MODEL_CHAT`,
//! `OPENAI_REASONING_EFFORT`) are honored so existing `.env` files keep
//! working.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::persona::redaction::{MatchStrictness, DEFAULT_PLACEHOLDER};

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration loaded from TOML.
///
/// Path: `./config.toml` or `$PERSONA_CONFIG_PATH`.
/// Precedence: env vars > config file > defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application-level settings (`[app]`).
    pub app: AppSection,
    /// Model service settings (`[llm]`).
    pub llm: LlmConfig,
    /// Network-call boundary settings (`[http]`).
    pub http: HttpConfig,
    /// Redaction enforcement settings (`[redaction]`).
    pub redaction: RedactionConfig,
}

impl AppConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// If the file does not exist, defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from the TOML file only, no env overrides.
    fn load_from_file() -> Result<Self> {
        let path = Self::config_path_with(|key| std::env::var(key).ok());
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                let config: AppConfig =
                    toml::from_str(&contents).context("failed to parse config TOML")?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found, using defaults");
                Ok(AppConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve the config path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(p) = env("PERSONA_CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("config.toml")
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability.
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("PERSONA_LOG_LEVEL") {
            self.app.log_level = v;
        }

        if let Some(v) = env("OPENAI_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = env("OPENAI_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = env("OPENAI_MODEL_CHAT") {
            self.llm.model = v;
        }
        if let Some(v) = env("OPENAI_REASONING_EFFORT") {
            self.llm.reasoning_effort = v;
        }

        if let Some(v) = env("PERSONA_HTTP_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.http.timeout_seconds = n,
                Err(_) => tracing::warn!(
                    var = "PERSONA_HTTP_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }

        if let Some(v) = env("PERSONA_REDACTION_STRICTNESS") {
            match v.parse::<StrictnessName>() {
                Ok(name) => self.redaction.strictness = name,
                Err(_) => tracing::warn!(
                    var = "PERSONA_REDACTION_STRICTNESS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Parse a TOML string into config (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }
}

// ── App section ─────────────────────────────────────────────────

/// Application-level settings (`[app]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// Tracing log level filter fallback when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// ── LLM section ─────────────────────────────────────────────────

/// Model service configuration (`[llm]`).
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL.
    pub base_url: String,
    /// API credential. Required at client construction; usually supplied
    /// via `OPENAI_API_KEY` rather than the file.
    pub api_key: Option<String>,
    /// Model identifier.
    #[serde(alias = "default_model")]
    pub model: String,
    /// Reasoning-effort hint (`low`, `medium`, `high`).
    pub reasoning_effort: String,
}

impl LlmConfig {
    /// The credential, or a setup-guidance error when absent.
    ///
    /// # Errors
    ///
    /// Returns an error naming `OPENAI_API_KEY` when no key is configured.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "OPENAI_API_KEY is not set. Add it to your environment, a .env file, \
                     or [llm].api_key in config.toml."
                )
            })
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            model: "gpt-5".to_string(),
            reasoning_effort: "low".to_string(),
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "__REDACTED__"))
            .field("model", &self.model)
            .field("reasoning_effort", &self.reasoning_effort)
            .finish()
    }
}

// ── HTTP section ────────────────────────────────────────────────

/// Network-call boundary settings (`[http]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Whether to retry once on transient failure (transport errors, 5xx).
    /// Auth and quota errors are never retried regardless.
    pub retry_transient: bool,
}

impl HttpConfig {
    /// The timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 120,
            retry_transient: true,
        }
    }
}

// ── Redaction section ───────────────────────────────────────────

/// Redaction enforcement settings (`[redaction]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Matching strictness: `"substring"` (default) or `"tokens"`.
    pub strictness: StrictnessName,
    /// Replacement text for the local redaction pass.
    pub placeholder: String,
}

impl RedactionConfig {
    /// The configured strictness as the matcher-level enum.
    pub fn strictness(&self) -> MatchStrictness {
        match self.strictness {
            StrictnessName::Substring => MatchStrictness::ExactSubstring,
            StrictnessName::Tokens => MatchStrictness::NameTokens,
        }
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            strictness: StrictnessName::Substring,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// Config-file spelling of the matcher strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrictnessName {
    /// Case-insensitive exact-substring matching.
    #[default]
    Substring,
    /// Also match permutations of the name tokens.
    Tokens,
}

impl std::str::FromStr for StrictnessName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "tokens" => Ok(Self::Tokens),
            _ => Err(()),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
