// roundtable-core/src/models/transcript.rs
use super::chat::ChatMessage;
use super::tools::ToolCall;
use serde::{Deserialize, Serialize};

/// Outcome of executing one tool call: exactly one of a successful result
/// or an error description.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

/// Record of one tool call and its execution outcome, frozen once created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolInvocationRecord {
    pub call: ToolCall,
    pub outcome: ToolOutcome,
}

impl ToolInvocationRecord {
    pub fn success(call: ToolCall, output: impl Into<String>) -> Self {
        Self {
            call,
            outcome: ToolOutcome::Success(output.into()),
        }
    }

    pub fn failure(call: ToolCall, error: impl Into<String>) -> Self {
        Self {
            call,
            outcome: ToolOutcome::Failure(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success(_))
    }
}

/// Why a turn ended.
///
/// `MaxStepsReached` is a policy outcome, not an error: the step bound was
/// exhausted while the model was still requesting tools.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Complete,
    MaxStepsReached,
}

/// One participant's contribution to a conversation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub participant: String,
    pub message: ChatMessage,
    pub invocations: Vec<ToolInvocationRecord>,
    pub stop_reason: StopReason,
}

impl ConversationTurn {
    pub fn text(&self) -> &str {
        self.message.text()
    }
}

/// Append-only ordered record of the turns in a conversation.
///
/// Existing turns are never mutated; forking a conversation copies a prefix
/// into a fresh transcript. The transcript is plain data owned by the
/// caller, who may persist it or feed it back in to continue a run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConversationTranscript {
    turns: Vec<ConversationTurn>,
}

impl ConversationTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Copy of the first `len` turns, for forking or continuing a
    /// conversation from a known point. A `len` past the end yields a full
    /// copy.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            turns: self.turns.iter().take(len).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(participant: &str, text: &str) -> ConversationTurn {
        ConversationTurn {
            participant: participant.to_string(),
            message: ChatMessage::assistant(text),
            invocations: Vec::new(),
            stop_reason: StopReason::Complete,
        }
    }

    #[test]
    fn transcript_appends_in_order() {
        let mut transcript = ConversationTranscript::new();
        transcript.push(turn("Alice", "hi"));
        transcript.push(turn("Bob", "hello"));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[0].participant, "Alice");
        assert_eq!(transcript.last().unwrap().participant, "Bob");
    }

    #[test]
    fn prefix_copies_without_sharing() {
        let mut transcript = ConversationTranscript::new();
        transcript.push(turn("Alice", "one"));
        transcript.push(turn("Bob", "two"));
        transcript.push(turn("Alice", "three"));

        let mut fork = transcript.prefix(2);
        assert_eq!(fork.len(), 2);
        fork.push(turn("Carol", "four"));

        // The source transcript is untouched by edits to the fork.
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.turns()[2].text(), "three");
        assert_eq!(fork.turns()[2].participant, "Carol");
    }

    #[test]
    fn prefix_past_end_is_full_copy() {
        let mut transcript = ConversationTranscript::new();
        transcript.push(turn("Alice", "only"));
        assert_eq!(transcript.prefix(10), transcript);
    }

    #[test]
    fn record_outcomes_are_exclusive() {
        let call = ToolCall::function("call_1", "probe", "{}");
        let ok = ToolInvocationRecord::success(call.clone(), "out");
        let err = ToolInvocationRecord::failure(call, "boom");
        assert!(ok.is_success());
        assert!(!err.is_success());
    }
}
