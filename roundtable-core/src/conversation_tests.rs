// roundtable-core/src/conversation_tests.rs
#![cfg(test)]

use crate::conversation::{ConversationOptions, ConversationRunner};
use crate::errors::EngineError;
use crate::models::tools::{ToolCall, ToolDefinition, ToolParametersDefinition};
use crate::test_support::{RecordingExecutor, ScriptedAdapter, participant};
use std::sync::Arc;

fn scripted(names_and_texts: &[&str]) -> Arc<ScriptedAdapter> {
    Arc::new(ScriptedAdapter::with_responses(
        names_and_texts
            .iter()
            .map(|text| ScriptedAdapter::text(text))
            .collect(),
    ))
}

#[tokio::test]
async fn requires_at_least_two_participants() {
    let alice = participant("Alice", scripted(&[]));
    let err = ConversationRunner::new(vec![alice]).unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
    assert!(err.to_string().contains("at least 2 participants"));
}

#[tokio::test]
async fn unknown_starting_participant_aborts_before_any_call() {
    let alice_adapter = scripted(&["a"]);
    let bob_adapter = scripted(&["b"]);
    let runner = ConversationRunner::new(vec![
        participant("Alice", alice_adapter.clone()),
        participant("Bob", bob_adapter.clone()),
    ])
    .unwrap();

    let aborted = runner
        .run(ConversationOptions::new("hi", 4).starting_with("Carol"))
        .await
        .unwrap_err();

    assert!(matches!(aborted.source, EngineError::Config(_)));
    assert!(aborted.source.to_string().contains("Carol"));
    assert!(aborted.transcript.is_empty());
    assert_eq!(alice_adapter.call_count(), 0);
    assert_eq!(bob_adapter.call_count(), 0);
}

#[tokio::test]
async fn strict_round_robin_order() {
    let runner = ConversationRunner::new(vec![
        participant("Alice", scripted(&["A1", "A2"])),
        participant("Bob", scripted(&["B1", "B2"])),
    ])
    .unwrap();

    let transcript = runner
        .run(ConversationOptions::new("Begin", 4))
        .await
        .unwrap();

    let order: Vec<_> = transcript
        .turns()
        .iter()
        .map(|t| t.participant.as_str())
        .collect();
    assert_eq!(order, ["Alice", "Bob", "Alice", "Bob"]);
    let texts: Vec<_> = transcript.turns().iter().map(|t| t.text()).collect();
    assert_eq!(texts, ["A1", "B1", "A2", "B2"]);
}

#[tokio::test]
async fn starting_participant_shifts_the_rotation() {
    let runner = ConversationRunner::new(vec![
        participant("Alice", scripted(&["A1"])),
        participant("Bob", scripted(&["B1", "B2"])),
    ])
    .unwrap();

    let transcript = runner
        .run(ConversationOptions::new("Begin", 3).starting_with("Bob"))
        .await
        .unwrap();

    let order: Vec<_> = transcript
        .turns()
        .iter()
        .map(|t| t.participant.as_str())
        .collect();
    assert_eq!(order, ["Bob", "Alice", "Bob"]);
}

#[tokio::test]
async fn threads_prior_turn_content_as_next_message() {
    let alice_adapter = scripted(&["A1", "A2"]);
    let bob_adapter = scripted(&["B1"]);
    let runner = ConversationRunner::new(vec![
        participant("Alice", alice_adapter.clone()),
        participant("Bob", bob_adapter.clone()),
    ])
    .unwrap();

    runner
        .run(ConversationOptions::new("Begin", 3))
        .await
        .unwrap();

    // Iteration 1 delivers the literal starting message.
    let first = alice_adapter.recorded().remove(0);
    assert_eq!(first.messages.len(), 1);
    assert_eq!(first.messages[0].role, "user");
    assert_eq!(first.messages[0].text(), "Begin");

    // Bob sees the transcript rendered by absolute parity plus Alice's
    // reply as the fresh user message.
    let bob_call = bob_adapter.recorded().remove(0);
    let roles: Vec<_> = bob_call.messages.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, ["user", "user"]);
    assert_eq!(bob_call.messages[0].text(), "A1");
    assert_eq!(bob_call.messages[1].text(), "A1");

    // Alice's second turn: [user A1, assistant B1] history + B1 as message.
    let alice_second = alice_adapter.recorded().remove(1);
    let roles: Vec<_> = alice_second
        .messages
        .iter()
        .map(|m| m.role.as_str())
        .collect();
    assert_eq!(roles, ["user", "assistant", "user"]);
    assert_eq!(alice_second.messages[1].text(), "B1");
    assert_eq!(alice_second.messages[2].text(), "B1");
}

#[tokio::test]
async fn stop_condition_halts_after_the_appended_turn() {
    let runner = ConversationRunner::new(vec![
        participant("Alice", scripted(&["A1", "A2", "A3"])),
        participant("Bob", scripted(&["B1", "B2", "B3"])),
    ])
    .unwrap();

    let transcript = runner
        .run(ConversationOptions::new("Begin", 10).stop_when(|t| t.len() >= 2))
        .await
        .unwrap();

    assert_eq!(transcript.len(), 2);
}

#[tokio::test]
async fn max_turns_applies_even_with_a_stop_condition() {
    let runner = ConversationRunner::new(vec![
        participant("Alice", scripted(&["A1", "A2"])),
        participant("Bob", scripted(&["B1", "B2"])),
    ])
    .unwrap();

    let transcript = runner
        .run(ConversationOptions::new("Begin", 3).stop_when(|_| false))
        .await
        .unwrap();

    assert_eq!(transcript.len(), 3);
}

#[tokio::test]
async fn zero_max_turns_produces_nothing() {
    let alice_adapter = scripted(&["A1"]);
    let runner = ConversationRunner::new(vec![
        participant("Alice", alice_adapter.clone()),
        participant("Bob", scripted(&["B1"])),
    ])
    .unwrap();

    let transcript = runner
        .run(ConversationOptions::new("Begin", 0))
        .await
        .unwrap();

    assert!(transcript.is_empty());
    assert_eq!(alice_adapter.call_count(), 0);
}

#[tokio::test]
async fn continuation_preserves_the_prefix_and_admits_new_participants() {
    let first_runner = ConversationRunner::new(vec![
        participant("Alice", scripted(&["A1"])),
        participant("Bob", scripted(&["B1"])),
    ])
    .unwrap();
    let original = first_runner
        .run(ConversationOptions::new("Begin", 2))
        .await
        .unwrap();
    assert_eq!(original.len(), 2);

    // A new roster joins mid-conversation by continuing the transcript.
    let second_runner = ConversationRunner::new(vec![
        participant("Alice", scripted(&["A2"])),
        participant("Carol", scripted(&["C1"])),
    ])
    .unwrap();
    let continued = second_runner
        .run(
            ConversationOptions::new("Carol has joined; please continue.", 2)
                .continue_from(original.clone()),
        )
        .await
        .unwrap();

    assert_eq!(continued.len(), 4);
    assert_eq!(&continued.turns()[..2], original.turns());
    assert_eq!(continued.turns()[2].participant, "Alice");
    assert_eq!(continued.turns()[3].participant, "Carol");
}

#[tokio::test]
async fn failed_turn_aborts_and_keeps_the_partial_transcript() {
    let bob_adapter = Arc::new(ScriptedAdapter::with_script(vec![Err(
        "rate limited".to_string(),
    )]));
    let runner = ConversationRunner::new(vec![
        participant("Alice", scripted(&["A1", "A2"])),
        participant("Bob", bob_adapter),
    ])
    .unwrap();

    let aborted = runner
        .run(ConversationOptions::new("Begin", 4))
        .await
        .unwrap_err();

    assert_eq!(aborted.transcript.len(), 1);
    assert_eq!(aborted.transcript.turns()[0].participant, "Alice");
    assert_eq!(aborted.transcript.turns()[0].text(), "A1");
    assert!(matches!(aborted.source, EngineError::Provider(_)));
    assert_eq!(aborted.source.to_string(), "rate limited");
}

#[tokio::test]
async fn shared_tools_are_recorded_on_the_turn() {
    let alice_adapter = Arc::new(ScriptedAdapter::with_responses(vec![
        ScriptedAdapter::tool_calls(vec![ToolCall::function("call_1", "probe", "{}")]),
        ScriptedAdapter::text("Probed."),
    ]));
    let bob_adapter = scripted(&["Noted."]);
    let tools = vec![ToolDefinition::new(
        "probe",
        "Probe something",
        ToolParametersDefinition::empty(),
    )];
    let executor = Arc::new(RecordingExecutor::succeeding("probe", "all clear"));

    let runner = ConversationRunner::with_tools(
        vec![
            participant("Alice", alice_adapter),
            participant("Bob", bob_adapter.clone()),
        ],
        tools,
        executor.clone(),
    )
    .unwrap();

    let transcript = runner
        .run(ConversationOptions::new("Begin", 2))
        .await
        .unwrap();

    assert_eq!(transcript.len(), 2);
    let first_turn = &transcript.turns()[0];
    assert_eq!(first_turn.invocations.len(), 1);
    assert_eq!(first_turn.invocations[0].call.name(), "probe");
    assert!(first_turn.invocations[0].is_success());
    assert_eq!(executor.call_count(), 1);

    // The tool set is offered uniformly, Bob included.
    let bob_call = bob_adapter.recorded().remove(0);
    assert_eq!(bob_call.tools.as_ref().map(Vec::len), Some(1));
}
