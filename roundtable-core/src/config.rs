// roundtable-core/src/config.rs

//! Configuration structures and TOML parsing for the harness.
//!
//! Credentials are resolved from the environment exactly once, while
//! building adapters; nothing in the engines reads ambient state.

use crate::errors::EngineError;
use crate::participant::Participant;
use crate::providers::anthropic::AnthropicAdapter;
use crate::providers::openai::OpenAIAdapter;
use crate::providers::{ProviderAdapter, ProviderRegistry};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;
use url::Url;

/// Sampling parameters for one participant's requests.
///
/// Unset fields are omitted from outbound payloads so each backend applies
/// its own defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub seed: Option<u64>,
}

impl GenerationConfig {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Top-level harness configuration, parsed from TOML.
#[derive(Deserialize, Debug, Clone)]
pub struct HarnessConfig {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub participants: Vec<ParticipantConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProviderConfig {
    // `type` in TOML, mapped to `provider_type`
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub api_key_env_var: String,
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ParticipantConfig {
    pub name: String,
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub system_prompts: Vec<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl HarnessConfig {
    pub fn from_toml_str(content: &str) -> Result<HarnessConfig, EngineError> {
        let config: HarnessConfig = toml::from_str(content).map_err(|e| {
            EngineError::config(format!("Failed to parse configuration TOML: {}", e))
        })?;

        for (key, provider) in &config.providers {
            if provider.provider_type.trim().is_empty() {
                return Err(EngineError::config(format!(
                    "Provider '{}' is missing 'type'.",
                    key
                )));
            }
            if !matches!(provider.provider_type.as_str(), "openai" | "anthropic") {
                return Err(EngineError::config(format!(
                    "Provider '{}' has unsupported type '{}'.",
                    key, provider.provider_type
                )));
            }
            if let Some(endpoint) = &provider.endpoint {
                Url::parse(endpoint).map_err(|e| {
                    EngineError::config(format!(
                        "Invalid endpoint URL '{}' for provider '{}': {}",
                        endpoint, key, e
                    ))
                })?;
            }
        }

        let mut seen = HashSet::new();
        for participant in &config.participants {
            if participant.name.trim().is_empty() {
                return Err(EngineError::config("Participant with empty name."));
            }
            if !seen.insert(participant.name.as_str()) {
                return Err(EngineError::config(format!(
                    "Duplicate participant name '{}'.",
                    participant.name
                )));
            }
            if participant.model.trim().is_empty() {
                return Err(EngineError::config(format!(
                    "Participant '{}' is missing 'model'.",
                    participant.name
                )));
            }
            if !config.providers.contains_key(&participant.provider) {
                return Err(EngineError::config(format!(
                    "Participant '{}' references unknown provider '{}'.",
                    participant.name, participant.provider
                )));
            }
        }

        Ok(config)
    }

    /// Builds one shared adapter per configured provider, resolving API keys
    /// from the named environment variables now.
    pub fn build_registry(&self, http_client: &reqwest::Client) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        for (id, provider_conf) in &self.providers {
            let api_key = if provider_conf.api_key_env_var.is_empty() {
                String::new()
            } else {
                match std::env::var(&provider_conf.api_key_env_var) {
                    Ok(key) => key,
                    Err(e) => {
                        warn!(
                            provider_id = %id,
                            env_var = %provider_conf.api_key_env_var,
                            error = %e,
                            "API key environment variable not set or invalid"
                        );
                        String::new()
                    }
                }
            };

            let adapter: Arc<dyn ProviderAdapter> = match provider_conf.provider_type.as_str() {
                "anthropic" => match &provider_conf.endpoint {
                    Some(endpoint) => Arc::new(AnthropicAdapter::with_endpoint(
                        endpoint,
                        http_client.clone(),
                        api_key,
                    )),
                    None => Arc::new(AnthropicAdapter::new(http_client.clone(), api_key)),
                },
                // from_toml_str has already narrowed the type
                _ => match &provider_conf.endpoint {
                    Some(endpoint) => Arc::new(OpenAIAdapter::with_endpoint(
                        endpoint,
                        http_client.clone(),
                        api_key,
                    )),
                    None => Arc::new(OpenAIAdapter::new(http_client.clone(), api_key)),
                },
            };
            registry.register(id.clone(), adapter);
        }
        registry
    }

    /// Materializes the configured participants against a registry.
    pub fn build_participants(
        &self,
        registry: &ProviderRegistry,
    ) -> Result<Vec<Participant>, EngineError> {
        self.participants
            .iter()
            .map(|conf| {
                let adapter = registry
                    .get(&conf.provider)
                    .map_err(|e| EngineError::config(e.to_string()))?;
                let generation = GenerationConfig {
                    model: conf.model.clone(),
                    temperature: conf.temperature,
                    top_p: conf.top_p,
                    max_tokens: conf.max_tokens,
                    seed: conf.seed,
                };
                Ok(Participant::new(&conf.name, adapter, generation)
                    .with_system_prompts(conf.system_prompts.clone()))
            })
            .collect()
    }
}
