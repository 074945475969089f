// roundtable-core/src/providers/openai.rs
use super::{ProviderAdapter, post_chat};
use crate::config::GenerationConfig;
use crate::models::chat::{ChatMessage, ChatResponse, ResponseFormat, ToolChoice};
use crate::models::tools::{ToolCall, ToolDefinition};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json, to_value};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Adapter for the OpenAI chat-completions API and compatible endpoints
/// (xAI, Ollama's OpenAI facade, most gateways).
///
/// The crate's message and tool-call types already use this wire shape, so
/// translation is mostly direct serialization.
#[derive(Clone)]
pub struct OpenAIAdapter {
    endpoint: String,
    api_key: String,
    http_client: Client,
}

impl OpenAIAdapter {
    pub fn new(http_client: Client, api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_OPENAI_ENDPOINT, http_client, api_key)
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
        if !self.api_key.is_empty() {
            headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", self.api_key),
            );
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
        let mut payload = json!({
            "model": generation.model,
            "messages": to_value(messages)?,
        });

        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            let tools_json: Vec<Value> = tools
                .iter()
                .map(|tool_def| {
                    json!({
                        "type": "function",
                        "function": tool_def,
                    })
                })
                .collect();
            payload["tools"] = Value::Array(tools_json);
            payload["tool_choice"] = json!(tool_choice.as_str());
        }

        if let Some(temperature) = generation.temperature {
            payload["temperature"] = json!(temperature);
        }
        if let Some(top_p) = generation.top_p {
            payload["top_p"] = json!(top_p);
        }
        if let Some(max_tokens) = generation.max_tokens {
            payload["max_tokens"] = json!(max_tokens);
        }
        if let Some(seed) = generation.seed {
            payload["seed"] = json!(seed);
        }

        match response_format {
            None | Some(ResponseFormat::Text) => {}
            Some(ResponseFormat::JsonSchema { name, schema }) => {
                payload["response_format"] = json!({
                    "type": "json_schema",
                    "json_schema": { "name": name, "schema": schema },
                });
            }
        }

        Ok(payload)
    }

    fn parse_response(response_body: &str) -> Result<ChatResponse> {
        let mut raw: Value = serde_json::from_str(response_body)
            .with_context(|| format!("Failed to parse OpenAI response: {}", response_body))?;

        // Some compatible gateways omit the response id; backfill so the
        // raw payload always carries one.
        if let Some(object) = raw.as_object_mut() {
            if !object.contains_key("id") {
                let new_id = format!("chatcmpl-{}", Uuid::new_v4());
                debug!(id = %new_id, "OpenAI response missing 'id', backfilling");
                object.insert("id".to_string(), json!(new_id));
            }
        }

        let choice = raw
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .ok_or_else(|| {
                anyhow!(
                    "OpenAI response contained no choices: {}",
                    response_body
                )
            })?;

        let message_value = choice
            .get("message")
            .ok_or_else(|| anyhow!("OpenAI choice missing 'message': {}", response_body))?;

        let role = message_value
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or("assistant");
        let content = message_value
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string);

        // An absent call id becomes an empty string here; the turn engine
        // rejects it. Dropping the call at this layer would hide it.
        let tool_calls: Vec<ToolCall> = message_value
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(|calls| {
                calls
                    .iter()
                    .filter_map(|call| {
                        let function = call.get("function")?;
                        let name = function.get("name")?.as_str()?;
                        let arguments = function
                            .get("arguments")
                            .and_then(Value::as_str)
                            .unwrap_or("{}");
                        let id = call.get("id").and_then(Value::as_str).unwrap_or("");
                        Some(ToolCall::function(id, name, arguments))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let stop_reason = choice
            .get("finish_reason")
            .and_then(Value::as_str)
            .map(str::to_string);

        let message = ChatMessage {
            role: role.to_string(),
            content,
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

#[async_trait]
impl ProviderAdapter for OpenAIAdapter {
    fn name(&self) -> &str {
        "openai"
    }

    async fn send_chat(
        &self,
        generation: &GenerationConfig,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
        tool_choice: ToolChoice,
        response_format: Option<&ResponseFormat>,
    ) -> Result<ChatResponse> {
        if self.api_key.is_empty() {
            warn!(
                model = %generation.model,
                "API key is empty for OpenAI adapter; the call will likely be rejected"
            );
        }

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
