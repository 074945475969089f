// roundtable-core/src/providers/mod.rs
use crate::config::GenerationConfig;
use crate::models::chat::{ChatMessage, ChatResponse, ResponseFormat, ToolChoice};
use crate::models::tools::ToolDefinition;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// The normalization boundary between the engines and one model backend.
///
/// An implementation translates the ordered message history (system prompts
/// already included) into its backend's wire shape, performs exactly one
/// external call, and normalizes the reply back into [`ChatResponse`]
/// values. No retries, no caching; any failure propagates unmodified.
///
/// `tool_choice` must be honored faithfully. A backend that cannot express
/// the requested mode (or the requested `response_format`) must fail with
/// an explicit capability error rather than silently ignoring it.
///
/// Credentials and endpoints are passed in at construction, never read from
/// process-wide state, so differently-configured adapters for the same
/// backend can coexist.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    async fn send_chat(
        &self,
        generation: &GenerationConfig,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
        tool_choice: ToolChoice,
        response_format: Option<&ResponseFormat>,
    ) -> Result<ChatResponse>;

    fn name(&self) -> &str;

    /// Whether the backend natively supports tool calling.
    fn supports_tools(&self) -> bool {
        true
    }
}

/// Performs the single HTTP POST an adapter is allowed per `send_chat`.
/// Non-success statuses surface as errors with the response body attached;
/// there is deliberately no retry path here.
pub(crate) async fn post_chat(
    http_client: &Client,
    endpoint: &str,
    headers: HashMap<String, String>,
    payload: &Value,
) -> Result<String> {
    let mut header_map = reqwest::header::HeaderMap::new();
    for (key, value) in headers {
        if let (Ok(name), Ok(val)) = (
            reqwest::header::HeaderName::from_bytes(key.as_bytes()),
            reqwest::header::HeaderValue::from_str(&value),
        ) {
            header_map.insert(name, val);
        }
    }

    debug!(endpoint = %endpoint, "Sending chat completion request");
    let response = http_client
        .post(endpoint)
        .headers(header_map)
        .json(payload)
        .send()
        .await?;

    let status = response.status();
    let response_text = response.text().await?;

    if !status.is_success() {
        return Err(anyhow!(
            "API call failed with status {}: {}",
            status,
            response_text
        ));
    }

    Ok(response_text)
}

/// Shared adapters keyed by id, used by the configuration layer to wire one
/// adapter instance to many participants.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, provider: Arc<dyn ProviderAdapter>) {
        self.providers.insert(id.into(), provider);
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn ProviderAdapter>> {
        self.providers
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("Provider not found: {}", id))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

pub mod anthropic;
pub mod openai;
