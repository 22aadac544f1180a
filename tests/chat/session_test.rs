//! Session lifecycle tests: persona creation, transcript append semantics,
//! failure recovery.

use std::sync::Arc;

use persona_sim::chat::{ChatError, PersonaChat};
use persona_sim::persona::synthesizer::PersonaSynthesizer;
use persona_sim::persona::{IdentityHint, RedactionOutcome};
use persona_sim::session::{Session, TurnRole};

use crate::support::{auth_error, server_error, ScriptedClient};

const PROFILE_TEXT: &str = "## Background\nAn engineering leader.";

fn hint() -> IdentityHint {
    IdentityHint::named("Jordan Alex Rivers")
}

fn synthesizer(client: Arc<ScriptedClient>) -> PersonaSynthesizer {
    PersonaSynthesizer::new(client)
}

fn persona_chat(client: Arc<ScriptedClient>) -> PersonaChat {
    PersonaChat::new(client)
}

#[tokio::test]
async fn create_persona_installs_profile_and_label() {
    let client = Arc::new(ScriptedClient::replies(&[PROFILE_TEXT]));
    let synthesizer = synthesizer(Arc::clone(&client));
    let mut session = Session::new();

    let outcome = session
        .create_persona(&synthesizer, &hint())
        .await
        .expect("should create persona");

    assert_eq!(outcome, RedactionOutcome::Clean);
    assert_eq!(
        session.profile().map(|p| p.as_str()),
        Some(PROFILE_TEXT)
    );
    assert_eq!(session.persona_label(), Some("Jordan Alex Rivers"));
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn recreating_a_persona_clears_the_transcript() {
    let client = Arc::new(ScriptedClient::replies(&[
        PROFILE_TEXT,
        "a reply",
        "## Background\nAnother persona.",
    ]));
    let synthesizer = synthesizer(Arc::clone(&client));
    let chat = persona_chat(Arc::clone(&client));
    let mut session = Session::new();

    session
        .create_persona(&synthesizer, &hint())
        .await
        .expect("first persona");
    session
        .send_message(&chat, "hello")
        .await
        .expect("first message");
    assert_eq!(session.transcript().len(), 2);

    session
        .create_persona(&synthesizer, &IdentityHint::named("Casey Morgan Lee"))
        .await
        .expect("second persona");

    assert!(session.transcript().is_empty());
    assert_eq!(session.persona_label(), Some("Casey Morgan Lee"));
}

#[tokio::test]
async fn failed_synthesis_leaves_session_unchanged() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok(PROFILE_TEXT.to_owned()),
        Ok("a reply".to_owned()),
        Err(auth_error()),
    ]));
    let synthesizer = synthesizer(Arc::clone(&client));
    let chat = persona_chat(Arc::clone(&client));
    let mut session = Session::new();

    session
        .create_persona(&synthesizer, &hint())
        .await
        .expect("first persona");
    session
        .send_message(&chat, "hello")
        .await
        .expect("first message");

    session
        .create_persona(&synthesizer, &IdentityHint::named("Casey Morgan Lee"))
        .await
        .expect_err("second synthesis should fail");

    // Previous persona and transcript are untouched.
    assert_eq!(session.persona_label(), Some("Jordan Alex Rivers"));
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(
        session.profile().map(|p| p.as_str()),
        Some(PROFILE_TEXT)
    );
}

#[tokio::test]
async fn failed_synthesis_on_fresh_session_stores_nothing() {
    let client = Arc::new(ScriptedClient::new(vec![Err(server_error())]));
    let synthesizer = synthesizer(Arc::clone(&client));
    let mut session = Session::new();

    session
        .create_persona(&synthesizer, &hint())
        .await
        .expect_err("should fail");

    assert!(session.profile().is_none());
    assert!(session.persona_label().is_none());
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn chat_before_persona_fails_with_no_call_and_no_turns() {
    let client = Arc::new(ScriptedClient::unreachable());
    let chat = persona_chat(Arc::clone(&client));
    let mut session = Session::new();

    let err = session
        .send_message(&chat, "anyone there?")
        .await
        .expect_err("should fail precondition");

    assert!(matches!(err, ChatError::MissingPersona));
    assert_eq!(client.calls(), 0);
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn successful_turn_grows_transcript_by_exactly_two() {
    let client = Arc::new(ScriptedClient::replies(&[PROFILE_TEXT, "my take: it depends"]));
    let synthesizer = synthesizer(Arc::clone(&client));
    let chat = persona_chat(Arc::clone(&client));
    let mut session = Session::new();

    session
        .create_persona(&synthesizer, &hint())
        .await
        .expect("persona");
    assert!(session.transcript().is_empty());

    let reply = session
        .send_message(&chat, "What's your take on eventual consistency?")
        .await
        .expect("should reply");

    assert_eq!(reply.role, TurnRole::Assistant);
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.transcript()[0].role, TurnRole::User);
    assert_eq!(
        session.transcript()[0].text,
        "What's your take on eventual consistency?"
    );
    assert_eq!(session.transcript()[1].role, TurnRole::Assistant);
    assert_eq!(session.transcript()[1].text, "my take: it depends");
}

#[tokio::test]
async fn failed_turn_keeps_user_message_and_appends_no_assistant_turn() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok(PROFILE_TEXT.to_owned()),
        Err(server_error()),
        Ok("second time lucky".to_owned()),
    ]));
    let synthesizer = synthesizer(Arc::clone(&client));
    let chat = persona_chat(Arc::clone(&client));
    let mut session = Session::new();

    session
        .create_persona(&synthesizer, &hint())
        .await
        .expect("persona");

    session
        .send_message(&chat, "still there?")
        .await
        .expect_err("turn should fail");

    assert_eq!(session.transcript().len(), 1);
    assert_eq!(session.transcript()[0].role, TurnRole::User);
    assert_eq!(session.transcript()[0].text, "still there?");

    // Resubmitting succeeds and appends exactly one assistant turn.
    session
        .send_message(&chat, "still there?")
        .await
        .expect("retry should succeed");

    let assistant_turns = session
        .transcript()
        .iter()
        .filter(|t| t.role == TurnRole::Assistant)
        .count();
    assert_eq!(assistant_turns, 1);
    assert_eq!(session.transcript().len(), 3);
    assert_eq!(session.transcript()[2].text, "second time lucky");
}

#[tokio::test]
async fn retried_turn_forwards_prior_failed_message_in_order() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok(PROFILE_TEXT.to_owned()),
        Err(server_error()),
        Ok("reply".to_owned()),
    ]));
    let synthesizer = synthesizer(Arc::clone(&client));
    let chat = persona_chat(Arc::clone(&client));
    let mut session = Session::new();

    session
        .create_persona(&synthesizer, &hint())
        .await
        .expect("persona");
    let _ = session.send_message(&chat, "first attempt").await;
    session
        .send_message(&chat, "second attempt")
        .await
        .expect("should succeed");

    // The retry request (third upstream call) sees the failed user turn
    // followed by the new message, in chronological order.
    let request = client.request(2);
    let contents: Vec<&str> = request.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first attempt", "second attempt"]);
}
