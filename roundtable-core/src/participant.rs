// roundtable-core/src/participant.rs
use crate::config::GenerationConfig;
use crate::models::chat::ChatMessage;
use crate::providers::ProviderAdapter;
use std::fmt;
use std::sync::Arc;

/// One configured actor in a conversation: a name, a model, an adapter, and
/// the prompts that define its behavior.
///
/// A `Participant` is pure configuration with no mutable runtime state, so
/// the same value can drive any number of independent conversations, even
/// concurrently, as long as each conversation owns its own transcript.
#[derive(Clone)]
pub struct Participant {
    name: String,
    adapter: Arc<dyn ProviderAdapter>,
    generation: GenerationConfig,
    system_prompts: Vec<String>,
}

impl Participant {
    pub fn new(
        name: impl Into<String>,
        adapter: Arc<dyn ProviderAdapter>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            name: name.into(),
            adapter,
            generation,
            system_prompts: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompts.push(prompt.into());
        self
    }

    pub fn with_system_prompts(mut self, prompts: impl IntoIterator<Item = String>) -> Self {
        self.system_prompts.extend(prompts);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn adapter(&self) -> &Arc<dyn ProviderAdapter> {
        &self.adapter
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    pub fn model(&self) -> &str {
        &self.generation.model
    }

    pub fn system_prompts(&self) -> &[String] {
        &self.system_prompts
    }

    /// The system prompts as outbound messages, in their configured order.
    pub fn system_messages(&self) -> Vec<ChatMessage> {
        self.system_prompts
            .iter()
            .map(ChatMessage::system)
            .collect()
    }
}

// Trait objects have no Debug; print the adapter by name.
impl fmt::Debug for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participant")
            .field("name", &self.name)
            .field("adapter", &self.adapter.name())
            .field("generation", &self.generation)
            .field("system_prompts", &self.system_prompts)
            .finish()
    }
}
