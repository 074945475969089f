// roundtable-core/src/test_support.rs
//! Scripted fakes shared by the engine tests.

use crate::ToolExecutor;
use crate::config::GenerationConfig;
use crate::models::chat::{ChatMessage, ChatResponse, ResponseFormat, ToolChoice};
use crate::models::tools::{ToolCall, ToolDefinition, ToolInput};
use crate::participant::Participant;
use crate::providers::ProviderAdapter;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// One recorded `send_chat` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub tool_choice: ToolChoice,
    pub response_format: Option<ResponseFormat>,
}

/// Adapter that replays a fixed script of replies (or failures) and records
/// every request it receives.
pub struct ScriptedAdapter {
    script: Mutex<VecDeque<Result<ChatResponse, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedAdapter {
    pub fn empty() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_responses(responses: Vec<ChatResponse>) -> Self {
        Self::with_script(responses.into_iter().map(Ok).collect())
    }

    pub fn with_script(script: Vec<Result<ChatResponse, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A plain assistant reply.
    pub fn text(content: &str) -> ChatResponse {
        ChatResponse {
            message: ChatMessage::assistant(content),
            tool_calls: Vec::new(),
            stop_reason: Some("stop".to_string()),
            raw: Value::Null,
        }
    }

    /// An assistant reply requesting the given tool calls.
    pub fn tool_calls(calls: Vec<ToolCall>) -> ChatResponse {
        ChatResponse {
            message: ChatMessage::assistant_tool_calls(None, calls.clone()),
            tool_calls: calls,
            stop_reason: Some("tool_calls".to_string()),
            raw: Value::Null,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send_chat(
        &self,
        _generation: &GenerationConfig,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
        tool_choice: ToolChoice,
        response_format: Option<&ResponseFormat>,
    ) -> Result<ChatResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages,
            tools: tools.map(<[ToolDefinition]>::to_vec),
            tool_choice,
            response_format: response_format.cloned(),
        });

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(Self::text("Default response")),
        }
    }
}

/// Executor returning canned outputs per tool name, logging every call.
pub struct RecordingExecutor {
    outputs: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<(String, ToolInput)>>,
}

impl RecordingExecutor {
    pub fn new(outputs: HashMap<String, Result<String, String>>) -> Self {
        Self {
            outputs,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// An executor that succeeds for `name` with a fixed output.
    pub fn succeeding(name: &str, output: &str) -> Self {
        Self::new(HashMap::from([(
            name.to_string(),
            Ok(output.to_string()),
        )]))
    }

    pub fn calls(&self) -> Vec<(String, ToolInput)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ToolExecutor for RecordingExecutor {
    async fn execute_tool(&self, tool_name: &str, input: ToolInput) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((tool_name.to_string(), input));
        match self.outputs.get(tool_name) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(error)) => Err(anyhow!("{}", error)),
            None => Err(anyhow!("no output defined for tool '{}'", tool_name)),
        }
    }
}

/// A participant wired to the given scripted adapter.
pub fn participant(name: &str, adapter: Arc<ScriptedAdapter>) -> Participant {
    Participant::new(name, adapter, GenerationConfig::for_model("test-model"))
}
