// roundtable-core/src/turn.rs
use crate::ToolExecutor;
use crate::errors::EngineError;
use crate::models::chat::{ChatMessage, ChatResponse, ResponseFormat, ToolChoice};
use crate::models::tools::{ToolCall, ToolDefinition, ToolInput};
use crate::models::transcript::{StopReason, ToolInvocationRecord, ToolOutcome};
use crate::participant::Participant;
use crate::utils::preview;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

/// Default bound on tool-call rounds within one turn.
pub const DEFAULT_MAX_TOOL_STEPS: usize = 5;

/// Per-turn knobs. The defaults match a plain conversational turn.
#[derive(Debug, Clone)]
pub struct TurnOptions {
    /// Upper bound on request → execute → respond rounds. The adapter is
    /// invoked at most `max_tool_steps + 1` times per turn.
    pub max_tool_steps: usize,
    pub tool_choice: ToolChoice,
    pub response_format: Option<ResponseFormat>,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            max_tool_steps: DEFAULT_MAX_TOOL_STEPS,
            tool_choice: ToolChoice::Auto,
            response_format: None,
        }
    }
}

/// The result of one completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The participant's final reply for the turn.
    pub response: ChatResponse,
    /// Every tool invocation performed during the turn, in execution order.
    pub invocations: Vec<ToolInvocationRecord>,
    pub stop_reason: StopReason,
}

impl TurnOutcome {
    pub fn message(&self) -> &ChatMessage {
        &self.response.message
    }
}

/// Executes a single participant turn, resolving tool calls until the model
/// stops asking for them or the step bound is hit.
///
/// The runner is a bounded state machine with no hidden retries: every
/// provider call and tool execution happens exactly once, in order. A tool
/// set can only be attached together with an executor, so the
/// tools-without-executor misconfiguration is unrepresentable here; the
/// conversation engine performs the equivalent check for host-supplied
/// pairs.
pub struct TurnRunner<'a> {
    participant: &'a Participant,
    tools: &'a [ToolDefinition],
    executor: Option<&'a dyn ToolExecutor>,
}

impl<'a> TurnRunner<'a> {
    pub fn new(participant: &'a Participant) -> Self {
        Self {
            participant,
            tools: &[],
            executor: None,
        }
    }

    pub fn with_tools(
        participant: &'a Participant,
        tools: &'a [ToolDefinition],
        executor: &'a dyn ToolExecutor,
    ) -> Self {
        Self {
            participant,
            tools,
            executor: Some(executor),
        }
    }

    /// Runs one turn on top of `history`. `user_message` is appended as a
    /// fresh user message when present; pass `None` to continue directly
    /// from the history (for example after loading a transcript).
    pub async fn run_turn(
        &self,
        history: &[ChatMessage],
        user_message: Option<&str>,
        options: &TurnOptions,
    ) -> Result<TurnOutcome, EngineError> {
        let mut messages = self.participant.system_messages();
        messages.extend_from_slice(history);
        if let Some(text) = user_message {
            messages.push(ChatMessage::user(text));
        }

        info!(
            participant = %self.participant.name(),
            model = %self.participant.model(),
            num_messages = messages.len(),
            num_tools = self.tools.len(),
            "Starting turn"
        );

        let mut invocations: Vec<ToolInvocationRecord> = Vec::new();
        let mut steps = 0usize;
        let mut response = self.request(messages.clone(), options).await?;

        loop {
            if response.tool_calls.is_empty() {
                debug!(
                    participant = %self.participant.name(),
                    steps,
                    "Turn complete, no further tool calls"
                );
                return Ok(TurnOutcome {
                    response,
                    invocations,
                    stop_reason: StopReason::Complete,
                });
            }

            if steps >= options.max_tool_steps {
                // Policy outcome, not an error: hand back the last reply.
                info!(
                    participant = %self.participant.name(),
                    limit = options.max_tool_steps,
                    "Tool step limit reached, returning last reply"
                );
                return Ok(TurnOutcome {
                    response,
                    invocations,
                    stop_reason: StopReason::MaxStepsReached,
                });
            }

            let executor = self.executor.ok_or_else(|| {
                EngineError::validation(
                    "adapter returned tool calls, but no tools were offered this turn",
                )
            })?;

            // The whole round is validated before anything executes.
            for call in &response.tool_calls {
                if call.id.is_empty() {
                    return Err(EngineError::validation(format!(
                        "tool call '{}' is missing its call_id; the adapter must supply one",
                        call.function.name
                    )));
                }
            }

            debug!(
                count = response.tool_calls.len(),
                "Executing {} requested tool call(s)",
                response.tool_calls.len()
            );

            let mut assistant_message = response.message.clone();
            if assistant_message.tool_calls.is_none() {
                assistant_message.tool_calls = Some(response.tool_calls.clone());
            }
            messages.push(assistant_message);

            for call in &response.tool_calls {
                let record = execute_call(executor, call).await;
                let content = match &record.outcome {
                    ToolOutcome::Success(output) => output.clone(),
                    ToolOutcome::Failure(error) => error.clone(),
                };
                messages.push(ChatMessage::tool(call.id.as_str(), content));
                invocations.push(record);
            }

            steps += 1;
            response = self.request(messages.clone(), options).await?;
        }
    }

    async fn request(
        &self,
        messages: Vec<ChatMessage>,
        options: &TurnOptions,
    ) -> Result<ChatResponse, EngineError> {
        let tools = (!self.tools.is_empty()).then_some(self.tools);
        trace!(
            payload = %preview(&serde_json::to_string(&messages).unwrap_or_default(), 2000),
            "Outbound messages"
        );

        let response = self
            .participant
            .adapter()
            .send_chat(
                self.participant.generation(),
                messages,
                tools,
                options.tool_choice,
                options.response_format.as_ref(),
            )
            .await?;

        debug!(
            participant = %self.participant.name(),
            tool_calls = response.tool_calls.len(),
            stop_reason = ?response.stop_reason,
            "Received adapter reply"
        );
        Ok(response)
    }
}

/// Executes one tool call, folding argument-parse failures and executor
/// failures into failed records so sibling calls in the round still run.
async fn execute_call(executor: &dyn ToolExecutor, call: &ToolCall) -> ToolInvocationRecord {
    let tool_name = &call.function.name;
    let parsed: Result<HashMap<String, JsonValue>, _> =
        serde_json::from_str(&call.function.arguments);

    let input = match parsed {
        Ok(arguments) => ToolInput { arguments },
        Err(e) => {
            warn!(
                tool_call_id = %call.id,
                tool_name = %tool_name,
                error = %e,
                "Failed to parse tool arguments"
            );
            return ToolInvocationRecord::failure(
                call.clone(),
                format!(
                    "Error parsing arguments for tool '{}': {}. Arguments received: {}",
                    tool_name, e, call.function.arguments
                ),
            );
        }
    };

    trace!(tool_call_id = %call.id, tool_name = %tool_name, "Executing tool");
    match executor.execute_tool(tool_name, input).await {
        Ok(output) => {
            debug!(tool_call_id = %call.id, tool_name = %tool_name, "Tool executed");
            ToolInvocationRecord::success(call.clone(), output)
        }
        Err(e) => {
            warn!(tool_call_id = %call.id, tool_name = %tool_name, error = %e, "Tool failed");
            ToolInvocationRecord::failure(
                call.clone(),
                format!("Error executing tool '{}': {}", tool_name, e),
            )
        }
    }
}
