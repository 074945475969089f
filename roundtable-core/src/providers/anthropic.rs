// roundtable-core/src/providers/anthropic.rs
use super::{ProviderAdapter, post_chat};
use crate::config::GenerationConfig;
use crate::models::chat::{ChatMessage, ChatResponse, ResponseFormat, ToolChoice};
use crate::models::tools::{ToolCall, ToolDefinition};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::warn;

const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// The messages API requires max_tokens on every request.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Adapter for the Anthropic messages API.
///
/// Anthropic diverges from the OpenAI wire in every way this boundary
/// exists to absorb: system prompts live in a top-level `system` field,
/// assistant tool calls are `tool_use` content blocks, and tool results
/// travel as `tool_result` blocks inside a *user* message.
#[derive(Clone)]
pub struct AnthropicAdapter {
    endpoint: String,
    api_key: String,
    http_client: Client,
}

impl AnthropicAdapter {
    pub fn new(http_client: Client, api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_ANTHROPIC_ENDPOINT, http_client, api_key)
    }

    pub fn with_endpoint(
        endpoint: impl Into<String>,
        http_client: Client,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http_client,
        }
    }

    fn build_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert(
            "anthropic-version".to_string(),
            ANTHROPIC_VERSION.to_string(),
        );
        if !self.api_key.is_empty() {
            headers.insert("x-api-key".to_string(), self.api_key.clone());
        }
        headers
    }

    fn build_payload(
        generation: &GenerationConfig,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
        tool_choice: ToolChoice,
        response_format: Option<&ResponseFormat>,
    ) -> Result<Value> {
        if let Some(ResponseFormat::JsonSchema { .. }) = response_format {
            return Err(anyhow!(
                "Anthropic adapter does not support json_schema response_format; \
                 constrain the output through the system prompt instead"
            ));
        }

        let mut system_prompts = Vec::new();
        let mut converted = Vec::new();
        for message in messages {
            if message.role == "system" {
                system_prompts.push(message.text().to_string());
            } else {
                converted.push(convert_message(message)?);
            }
        }

        let mut payload = json!({
            "model": generation.model,
            "messages": converted,
            "max_tokens": generation.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });

        if !system_prompts.is_empty() {
            payload["system"] = json!(system_prompts.join("\n\n"));
        }
        if let Some(temperature) = generation.temperature {
            payload["temperature"] = json!(temperature);
        }
        if let Some(top_p) = generation.top_p {
            payload["top_p"] = json!(top_p);
        }
        if generation.seed.is_some() {
            warn!(model = %generation.model, "Anthropic has no sampling seed; ignoring");
        }

        // tool_choice "none" has no direct equivalent; withholding the tool
        // set produces the same contract (the model cannot call tools).
        match (tools.filter(|t| !t.is_empty()), tool_choice) {
            (Some(tools), choice @ (ToolChoice::Auto | ToolChoice::Required)) => {
                let tools_json: Vec<Value> = tools
                    .iter()
                    .map(|tool| {
                        json!({
                            "name": tool.name,
                            "description": tool.description,
                            "input_schema": tool.parameters,
                        })
                    })
                    .collect();
                payload["tools"] = Value::Array(tools_json);
                payload["tool_choice"] = match choice {
                    ToolChoice::Auto => json!({ "type": "auto" }),
                    ToolChoice::Required => json!({ "type": "any" }),
                    ToolChoice::None => unreachable!(),
                };
            }
            (Some(_), ToolChoice::None) | (None, _) => {}
        }

        Ok(payload)
    }

    fn parse_response(response_body: &str) -> Result<ChatResponse> {
        let raw: Value = serde_json::from_str(response_body)
            .with_context(|| format!("Failed to parse Anthropic response: {}", response_body))?;

        let blocks = raw
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                anyhow!(
                    "Anthropic response missing 'content' blocks: {}",
                    response_body
                )
            })?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in blocks {
            match block.get("type").and_then(Value::as_str) {
                Some("text") => {
                    if let Some(part) = block.get("text").and_then(Value::as_str) {
                        text.push_str(part);
                    }
                }
                Some("tool_use") => {
                    let name = block
                        .get("name")
                        .and_then(Value::as_str)
                        .ok_or_else(|| anyhow!("tool_use block missing 'name'"))?;
                    let id = block.get("id").and_then(Value::as_str).unwrap_or("");
                    let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                    tool_calls.push(ToolCall::function(id, name, input.to_string()));
                }
                other => {
                    warn!(block_type = ?other, "Skipping unrecognized Anthropic content block");
                }
            }
        }

        let stop_reason = raw
            .get("stop_reason")
            .and_then(Value::as_str)
            .map(str::to_string);

        let message = ChatMessage {
            role: "assistant".to_string(),
            content: (!text.is_empty()).then_some(text),
            tool_calls: (!tool_calls.is_empty()).then(|| tool_calls.clone()),
            tool_call_id: None,
        };

        Ok(ChatResponse {
            message,
            tool_calls,
            stop_reason,
            raw,
        })
    }
}

/// Re-frames one non-system message into Anthropic's content-block shape.
fn convert_message(message: ChatMessage) -> Result<Value> {
    if message.role == "tool" {
        let call_id = message
            .tool_call_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("tool message is missing its tool_call_id"))?;
        return Ok(json!({
            "role": "user",
            "content": [{
                "type": "tool_result",
                "tool_use_id": call_id,
                "content": message.content.clone().unwrap_or_default(),
            }],
        }));
    }

    if message.role == "assistant" && message.has_tool_calls() {
        let mut blocks = Vec::new();
        if let Some(text) = message.content.as_deref().filter(|t| !t.is_empty()) {
            blocks.push(json!({ "type": "text", "text": text }));
        }
        for call in message.tool_calls.as_deref().unwrap_or_default() {
            let input: Value = serde_json::from_str(&call.function.arguments)
                .unwrap_or_else(|_| json!(call.function.arguments));
            blocks.push(json!({
                "type": "tool_use",
                "id": call.id,
                "name": call.function.name,
                "input": input,
            }));
        }
        return Ok(json!({ "role": "assistant", "content": blocks }));
    }

    Ok(json!({ "role": message.role, "content": message.text() }))
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn send_chat(
        &self,
        generation: &GenerationConfig,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
        tool_choice: ToolChoice,
        response_format: Option<&ResponseFormat>,
    ) -> Result<ChatResponse> {
        let payload =
            Self::build_payload(generation, messages, tools, tool_choice, response_format)?;
        let body = post_chat(
            &self.http_client,
            &self.endpoint,
            self.build_headers(),
            &payload,
        )
        .await?;
        Self::parse_response(&body)
    }
}
