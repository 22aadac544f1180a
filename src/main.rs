#![allow(missing_docs)]

//! persona-sim CLI — create a persona from public hints, then chat as it.
//!
//! One synchronous upstream call per user action; the loop blocks until it
//! returns or fails. Every failure is recoverable by retrying the action.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use dialoguer::{Confirm, Input};
use tracing::info;

use persona_sim::chat::{ChatError, PersonaChat};
use persona_sim::config::AppConfig;
use persona_sim::persona::synthesizer::PersonaSynthesizer;
use persona_sim::persona::IdentityHint;
use persona_sim::providers::openai::OpenAiClient;
use persona_sim::providers::ModelClient;
use persona_sim::session::Session;

#[derive(Debug, Parser)]
#[command(
    name = "persona-sim",
    about = "Synthesize a redacted persona profile and chat as that persona",
    version
)]
struct Cli {
    /// Path to the config file (overrides $PERSONA_CONFIG_PATH).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model identifier override.
    #[arg(long)]
    model: Option<String>,

    /// Reasoning-effort override (low, medium, high).
    #[arg(long)]
    reasoning_effort: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up OPENAI_API_KEY etc. from a local .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Some(path) = &cli.config {
        std::env::set_var("PERSONA_CONFIG_PATH", path);
    }

    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(model) = cli.model {
        config.llm.model = model;
    }
    if let Some(effort) = cli.reasoning_effort {
        config.llm.reasoning_effort = effort;
    }

    persona_sim::logging::init(&config.app.log_level);

    let api_key = config.llm.require_api_key()?.to_owned();
    let client: Arc<dyn ModelClient> = Arc::new(
        OpenAiClient::new(
            config.llm.base_url.clone(),
            config.llm.model.clone(),
            Some(config.llm.reasoning_effort.clone()),
            api_key,
            config.http.timeout(),
            config.http.retry_transient,
        )
        .context("failed to build model client")?,
    );
    info!(model = %client.model_id(), "persona-sim starting");

    let synthesizer = PersonaSynthesizer::new(Arc::clone(&client))
        .with_strictness(config.redaction.strictness())
        .with_placeholder(config.redaction.placeholder.clone());
    let chat = PersonaChat::new(Arc::clone(&client));

    let mut session = Session::new();

    println!("{}", style("Persona Sim").bold());
    println!("Create a persona from public hints, then chat as that persona.\n");

    if !create_persona_interactive(&mut session, &synthesizer).await? {
        return Ok(());
    }
    chat_loop(&mut session, &synthesizer, &chat).await
}

/// Prompt for identity hints and synthesize a persona.
///
/// Loops on failure with a retry affordance; returns `false` if the user
/// gives up without an active persona.
async fn create_persona_interactive(
    session: &mut Session,
    synthesizer: &PersonaSynthesizer,
) -> Result<bool> {
    loop {
        let hint = prompt_hint()?;

        println!("{}", style("Researching and synthesizing persona...").dim());
        match session.create_persona(synthesizer, &hint).await {
            Ok(outcome) => {
                if outcome.needs_warning() {
                    println!(
                        "{}",
                        style(
                            "Warning: the profile may still reference the name; \
                             review it with /profile before relying on it."
                        )
                        .yellow()
                    );
                }
                println!(
                    "{} Chatting with: {}\n",
                    style("Persona created.").green(),
                    style(session.persona_label().unwrap_or("persona")).bold()
                );
                return Ok(true);
            }
            Err(e) => {
                println!("{} {e}", style("Failed to create persona:").red());
                if !Confirm::new()
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?
                {
                    return Ok(session.profile().is_some());
                }
            }
        }
    }
}

/// Read the identity-hint form from the terminal.
fn prompt_hint() -> Result<IdentityHint> {
    let full_name: String = Input::new()
        .with_prompt("Full name")
        .interact_text()
        .context("failed to read input")?;
    let linkedin_url: String = Input::new()
        .with_prompt("LinkedIn URL (optional)")
        .allow_empty(true)
        .interact_text()?;
    let x_url: String = Input::new()
        .with_prompt("X (Twitter) URL (optional)")
        .allow_empty(true)
        .interact_text()?;
    let notes: String = Input::new()
        .with_prompt("Additional context (optional)")
        .allow_empty(true)
        .interact_text()?;

    let optional = |s: String| -> Option<String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    };

    Ok(IdentityHint {
        full_name,
        linkedin_url: optional(linkedin_url),
        x_url: optional(x_url),
        notes: optional(notes),
    })
}

/// Run the chat loop until the user quits.
async fn chat_loop(
    session: &mut Session,
    synthesizer: &PersonaSynthesizer,
    chat: &PersonaChat,
) -> Result<()> {
    println!("Commands: /profile (show persona), /new (new persona), /quit\n");

    loop {
        let label = session.persona_label().unwrap_or("persona").to_owned();
        let line: String = Input::new()
            .with_prompt(format!("you → {label}"))
            .interact_text()
            .context("failed to read input")?;
        let line = line.trim().to_owned();

        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            return Ok(());
        }
        if line == "/profile" {
            match session.profile() {
                Some(profile) => println!("\n{profile}\n"),
                None => println!("{}", style("No persona yet.").yellow()),
            }
            continue;
        }
        if line == "/new" {
            if !create_persona_interactive(session, synthesizer).await? {
                return Ok(());
            }
            continue;
        }

        match session.send_message(chat, line).await {
            Ok(reply) => println!("\n{} {}\n", style(format!("{label}:")).bold(), reply.text),
            Err(ChatError::MissingPersona) => {
                println!("{}", style("Create a persona first (use /new).").yellow());
            }
            Err(e) => {
                // The user turn stays in the transcript; resubmitting retries.
                println!("{} {e}", style("Error:").red());
            }
        }
    }
}
