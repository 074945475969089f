// roundtable-core/src/errors.rs
use crate::models::transcript::ConversationTranscript;
use thiserror::Error;

/// Errors raised by the orchestration engines.
///
/// Limit exhaustion (`max_tool_steps`, `max_turns`) is never an error; it is
/// reported through [`StopReason`](crate::models::transcript::StopReason)
/// and normal returns.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid caller-supplied configuration, detected before any external
    /// call is made.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// A provider adapter violated its normalization contract (for example a
    /// tool call without a correlation id). Never retried.
    #[error("Validation Error: {0}")]
    Validation(String),

    /// A failure inside a provider adapter (network, auth, malformed reply),
    /// passed through unmodified.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl EngineError {
    pub fn config(msg: impl Into<String>) -> Self {
        EngineError::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }
}

/// A conversation run that stopped early because a turn failed.
///
/// The transcript built before the failure remains valid and is carried
/// here so the caller can inspect, persist, or continue it.
#[derive(Error, Debug)]
#[error("conversation aborted after {} completed turn(s): {source}", .transcript.len())]
pub struct ConversationAborted {
    pub transcript: ConversationTranscript,
    #[source]
    pub source: EngineError,
}
