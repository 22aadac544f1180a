//! Grounding and ordering tests for `PersonaChat::respond`.

use std::sync::Arc;

use persona_sim::chat::{ChatError, PersonaChat};
use persona_sim::persona::PersonaProfile;
use persona_sim::providers::Role;
use persona_sim::session::{ConversationTurn, TurnRole};

use crate::support::ScriptedClient;

fn profile() -> PersonaProfile {
    PersonaProfile::new("## Background\nDistributed-systems engineering leader.")
}

fn persona_chat(client: Arc<ScriptedClient>) -> PersonaChat {
    PersonaChat::new(client)
}

#[tokio::test]
async fn empty_profile_fails_precondition_with_no_call() {
    let client = Arc::new(ScriptedClient::unreachable());
    let chat = persona_chat(Arc::clone(&client));

    let err = chat
        .respond(&PersonaProfile::new("   "), &[], "hello?")
        .await
        .expect_err("should fail precondition");

    assert!(matches!(err, ChatError::MissingPersona));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn reply_is_an_assistant_turn() {
    let client = Arc::new(ScriptedClient::replies(&["Consistency is a spectrum."]));
    let chat = persona_chat(Arc::clone(&client));

    let turn = chat
        .respond(&profile(), &[], "What's your take on eventual consistency?")
        .await
        .expect("should respond");

    assert_eq!(turn.role, TurnRole::Assistant);
    assert_eq!(turn.text, "Consistency is a spectrum.");
}

#[tokio::test]
async fn transcript_is_forwarded_in_chronological_order() {
    let client = Arc::new(ScriptedClient::replies(&["D"]));
    let chat = persona_chat(Arc::clone(&client));

    let transcript = vec![
        ConversationTurn::user("A"),
        ConversationTurn::assistant("B"),
        ConversationTurn::user("C"),
    ];
    chat.respond(&profile(), &transcript, "the new message")
        .await
        .expect("should respond");

    let request = client.request(0);
    let contents: Vec<&str> = request.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["A", "B", "C", "the new message"]);

    let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::User]);
}

#[tokio::test]
async fn new_user_message_is_always_last() {
    let client = Arc::new(ScriptedClient::replies(&["ok"]));
    let chat = persona_chat(Arc::clone(&client));

    chat.respond(
        &profile(),
        &[ConversationTurn::user("earlier")],
        "the latest question",
    )
    .await
    .expect("should respond");

    let request = client.request(0);
    let last = request.messages.last().expect("messages should be present");
    assert_eq!(last.role, Role::User);
    assert_eq!(last.content, "the latest question");
}

#[tokio::test]
async fn grounding_restates_profile_and_guardrails() {
    let client = Arc::new(ScriptedClient::replies(&["ok"]));
    let chat = persona_chat(Arc::clone(&client));

    chat.respond(&profile(), &[], "hi").await.expect("should respond");

    let request = client.request(0);
    assert_eq!(request.instructions.len(), 2);
    assert!(request.instructions[0].contains("Never claim to literally be"));
    assert!(request.instructions[1].contains("Distributed-systems engineering leader."));
}
