//! Conversation behaviour against a scripted model

use ethos_core::prelude::*;
use ethos_core::llm::{ScriptedProvider, ScriptedReply};
use futures::StreamExt;
use std::sync::Arc;

fn session(
    provider: Arc<ScriptedProvider>,
    personality: &str,
    max_history: usize,
) -> ConversationSession {
    ConversationSession::new(
        provider,
        PersonalityCatalog::builtin().require(personality).unwrap(),
        GroqModel::default(),
        &ConversationConfig::default().with_max_history(max_history),
    )
}

fn echo_replies(count: usize) -> Vec<ScriptedReply> {
    (1..=count)
        .map(|i| ScriptedReply::text(format!("reply-{}", i)))
        .collect()
}

#[tokio::test]
async fn test_history_keeps_most_recent_exchanges() {
    let provider = Arc::new(ScriptedProvider::with_replies(echo_replies(12)));
    let mut session = session(provider, "professional_assistant", 10);

    for i in 1..=12 {
        session.get_response(&format!("msg-{}", i)).await;
    }

    assert_eq!(session.history().len(), 20);

    let users: Vec<_> = session
        .turns()
        .filter(|t| t.is_user())
        .map(|t| t.content.clone())
        .collect();
    let expected: Vec<_> = (3..=12).map(|i| format!("msg-{}", i)).collect();
    assert_eq!(users, expected);

    let first = session.turns().next().unwrap();
    assert_eq!(first.content, "msg-3");
    assert_eq!(session.history().last().unwrap().content, "reply-12");
}

#[tokio::test]
async fn test_history_bound_for_any_capacity() {
    for max_history in 1..=4 {
        let exchanges = max_history * 3;
        let provider = Arc::new(ScriptedProvider::with_replies(echo_replies(exchanges)));
        let mut session = session(provider, "friendly_companion", max_history);

        for i in 1..=exchanges {
            session.get_response(&format!("msg-{}", i)).await;
            assert!(session.history().len() <= 2 * max_history);
        }

        assert_eq!(session.history().len(), 2 * max_history);
        let oldest_kept = exchanges - max_history + 1;
        assert_eq!(
            session.turns().next().unwrap().content,
            format!("msg-{}", oldest_kept)
        );
    }
}

#[tokio::test]
async fn test_system_prompt_sent_but_never_stored() {
    let provider = Arc::new(ScriptedProvider::with_replies(echo_replies(3)));
    let mut session = session(provider.clone(), "motivational_coach", 10);

    for i in 1..=3 {
        session.get_response(&format!("msg-{}", i)).await;
    }

    let prompt = &session.personality().system_prompt;
    assert!(session.turns().all(|t| &t.content != prompt));

    for request in provider.requests() {
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(&request.messages[0].content, prompt);
        assert_eq!(
            request
                .messages
                .iter()
                .filter(|m| m.role == MessageRole::System)
                .count(),
            1
        );
    }
}

#[tokio::test]
async fn test_clear_empties_history() {
    let provider = Arc::new(ScriptedProvider::with_replies(echo_replies(3)));
    let mut session = session(provider.clone(), "witty_intellectual", 10);
    session.get_response("one").await;
    session.get_response("two").await;

    session.clear();
    assert!(session.history().is_empty());

    session.get_response("three").await;
    let last = provider.requests().pop().unwrap();
    assert_eq!(last.messages.len(), 2);
}

#[tokio::test]
async fn test_failure_returns_message_and_keeps_history() {
    let provider = Arc::new(ScriptedProvider::with_replies([
        ScriptedReply::text("fine"),
        ScriptedReply::fail("invalid api key"),
    ]));
    let mut session = session(provider, "professional_assistant", 10);
    session.get_response("first").await;
    let before: Vec<_> = session.turns().cloned().collect();

    let reply = session.get_response("second").await;
    assert!(reply.starts_with("Error communicating with"));
    assert!(reply.contains("invalid api key"));

    let after: Vec<_> = session.turns().cloned().collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_streaming_records_joined_reply() {
    let provider = Arc::new(ScriptedProvider::with_replies([ScriptedReply::tokens([
        "Hel", "lo", " there",
    ])]));
    let mut session = session(provider, "creative_writer", 10);

    let tokens: Vec<String> = session
        .stream_response("hi")
        .filter_map(|event| async move { event.token().map(str::to_string) })
        .collect()
        .await;
    assert_eq!(tokens, ["Hel", "lo", " there"]);

    let turns: Vec<_> = session.turns().collect();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, TurnRole::User);
    assert_eq!(turns[0].content, "hi");
    assert_eq!(turns[1].role, TurnRole::Assistant);
    assert_eq!(turns[1].content, "Hello there");
}

#[tokio::test]
async fn test_streaming_and_blocking_share_history() {
    let provider = Arc::new(ScriptedProvider::with_replies([
        ScriptedReply::text("blocking"),
        ScriptedReply::tokens(["stream", "ed"]),
    ]));
    let mut session = session(provider.clone(), "professional_assistant", 10);

    session.get_response("a").await;
    let _: Vec<_> = session.stream_response("b").collect().await;

    let contents: Vec<_> = session.turns().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, ["a", "blocking", "b", "streamed"]);
    assert_eq!(provider.requests()[1].messages.len(), 4);
}

#[tokio::test]
async fn test_two_personalities_are_independent() {
    let provider = Arc::new(ScriptedProvider::with_replies(echo_replies(3)));
    let mut professional = session(provider.clone(), "professional_assistant", 10);
    let mut friendly = session(provider.clone(), "friendly_companion", 10);

    professional.get_response("draft an email").await;
    professional.get_response("shorter please").await;
    friendly.get_response("how was your day?").await;

    assert_eq!(professional.history().len(), 4);
    assert_eq!(friendly.history().len(), 2);
    assert_ne!(professional.id(), friendly.id());
    assert_eq!(professional.temperature(), 0.6);
    assert_eq!(friendly.temperature(), 0.8);

    let requests = provider.requests();
    let friendly_request = &requests[2];
    assert_eq!(friendly_request.messages.len(), 2);
    assert_eq!(friendly_request.temperature, Some(0.8));
    assert!(
        friendly_request.messages[0]
            .content
            .starts_with("You are a warm, friendly AI companion")
    );
}

#[tokio::test]
async fn test_manager_switch_starts_fresh_session() {
    let provider = Arc::new(ScriptedProvider::with_replies(echo_replies(2)));
    let mut manager = SessionManager::new(
        PersonalityCatalog::builtin().clone(),
        provider.clone(),
        ConversationConfig::default(),
        "professional_assistant",
        GroqModel::default(),
    )
    .unwrap();

    manager.send("hello").await;
    manager.select_personality("creative_writer").unwrap();
    manager.send("write a poem").await;

    let second = &provider.requests()[1];
    assert_eq!(second.messages.len(), 2);
    assert_eq!(second.temperature, Some(1.0));
    assert_eq!(manager.message_count(), 4);
}
