// roundtable-core/src/models/chat.rs
use super::tools::ToolCall;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A message in the chat history sequence sent to or received from a model.
///
/// Covers system, user, assistant, and tool messages. The shape follows the
/// OpenAI chat convention; provider adapters translate it to whatever their
/// backend expects.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain("assistant", content)
    }

    /// An assistant message carrying tool calls, optionally alongside text.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
            tool_calls: Some(tool_calls),
            ..Default::default()
        }
    }

    /// A tool-result message. `call_id` is the correlation id of the tool
    /// call being answered and must not be empty.
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let call_id = call_id.into();
        debug_assert!(!call_id.is_empty(), "tool message requires a call id");
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_call_id: Some(call_id),
            ..Default::default()
        }
    }

    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// The text content, or `""` for content-free messages.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}

/// Tool selection mode forwarded to the backend.
///
/// Adapters must honor the mode faithfully or fail with an explicit
/// capability error; silently ignoring it is a contract violation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    #[default]
    Auto,
    Required,
    None,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::Required => "required",
            ToolChoice::None => "none",
        }
    }
}

/// Desired response formatting, for backends that support schema-constrained
/// output.
///
/// Conformance of the reply to the schema is the caller's responsibility;
/// the core forwards the request and nothing more.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    Text,
    JsonSchema { name: String, schema: JsonValue },
}

/// One normalized reply from a provider adapter.
///
/// `tool_calls` is the normalized view of any calls the model issued this
/// round; the same calls also remain embedded in `message` so the message
/// can be appended to an outbound history verbatim. `raw` preserves the
/// backend's payload for callers that need provider-specific detail.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub message: ChatMessage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub raw: JsonValue,
}

impl ChatResponse {
    pub fn text(&self) -> &str {
        self.message.text()
    }
}
