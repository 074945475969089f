// roundtable-core/src/lib.rs

//! Orchestrates multiple independently configured language-model
//! participants into structured, multi-turn conversations.
//!
//! The building blocks, from the bottom up:
//!
//! - [`models`]: plain value types for messages, tools, and transcripts.
//! - [`ProviderAdapter`](providers::ProviderAdapter): the normalization
//!   boundary to one model backend, with adapters for OpenAI-compatible and
//!   Anthropic APIs included.
//! - [`TurnRunner`](turn::TurnRunner): one participant turn, including the
//!   bounded tool-call loop.
//! - [`ConversationRunner`](conversation::ConversationRunner): round-robin
//!   multi-participant conversations with stop conditions.
//! - [`TranscriptAnalyzer`](analyzer::TranscriptAnalyzer): a model reads a
//!   transcript once and produces a verdict, summary, or follow-up.
//!
//! Tool execution is host-supplied through [`ToolExecutor`]; the crate owns
//! no filesystem, process, or network boundary beyond the adapter calls.

pub mod analyzer;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod participant;
pub mod providers;
pub mod turn;
pub mod utils;

pub mod models {
    pub mod chat;
    pub mod tools;
    pub mod transcript;
}

#[cfg(test)]
mod test_support;


#[cfg(test)]
mod conversation_tests;

use anyhow::Result;

pub use analyzer::{TranscriptAnalyzer, render_transcript};
pub use config::{GenerationConfig, HarnessConfig, ParticipantConfig, ProviderConfig};
pub use conversation::{ConversationOptions, ConversationRunner, StopCondition};
pub use errors::{ConversationAborted, EngineError};
pub use models::chat::{ChatMessage, ChatResponse, ResponseFormat, ToolChoice};
pub use models::tools::{
    ToolCall, ToolDefinition, ToolFunction, ToolInput, ToolParameter, ToolParameterType,
    ToolParametersDefinition,
};
pub use models::transcript::{
    ConversationTranscript, ConversationTurn, StopReason, ToolInvocationRecord, ToolOutcome,
};
pub use participant::Participant;
pub use providers::{ProviderAdapter, ProviderRegistry};
pub use turn::{DEFAULT_MAX_TOOL_STEPS, TurnOptions, TurnOutcome, TurnRunner};

pub use async_trait::async_trait;

/// Executes a named tool call on behalf of a turn.
///
/// Supplied by the host; the engines treat it opaquely. A returned error is
/// captured as a failed [`ToolInvocationRecord`] and never aborts the
/// sibling calls of the same round. Whether a call naming an unknown tool
/// is rejected is the executor's decision — the turn engine does not check
/// names against the offered definitions.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute_tool(&self, tool_name: &str, input: ToolInput) -> Result<String>;
}
