// roundtable-core/src/models/tools.rs
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// A tool invocation requested by a model, as normalized by a provider
/// adapter.
///
/// `id` is the backend-assigned correlation id. Adapters must carry it
/// through verbatim; an empty id is rejected by the turn engine before any
/// tool executes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String, // always "function" on the OpenAI wire
    pub function: ToolFunction,
}

impl ToolCall {
    pub fn function(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: ToolFunction {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// The function call details within a [`ToolCall`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolFunction {
    pub name: String,
    /// Arguments as a JSON-encoded object string, per the OpenAI wire
    /// convention. Adapters for backends that deliver structured arguments
    /// serialize them into this field.
    pub arguments: String,
}

/// The schema for one tool offered to a model for a single turn.
///
/// Names must be unique within the set passed to any one turn.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ToolParametersDefinition,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParametersDefinition,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// JSON-schema-like parameter map for a tool.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolParametersDefinition {
    #[serde(rename = "type")]
    pub param_type: String,
    pub properties: HashMap<String, ToolParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ToolParametersDefinition {
    /// An `object` schema with the given properties and required names.
    pub fn object(
        properties: impl IntoIterator<Item = (String, ToolParameter)>,
        required: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            param_type: "object".to_string(),
            properties: properties.into_iter().collect(),
            required: required.into_iter().collect(),
        }
    }

    /// An `object` schema with no properties.
    pub fn empty() -> Self {
        Self::object([], [])
    }
}

/// A single parameter within a tool's schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolParameter {
    #[serde(rename = "type")]
    pub param_type: ToolParameterType,
    pub description: String,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ToolParameter>>,
}

impl ToolParameter {
    pub fn string(description: impl Into<String>) -> Self {
        Self::of(ToolParameterType::String, description)
    }

    pub fn of(param_type: ToolParameterType, description: impl Into<String>) -> Self {
        Self {
            param_type,
            description: description.into(),
            enum_values: None,
            items: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// Parsed arguments handed to a [`ToolExecutor`](crate::ToolExecutor) at
/// runtime.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ToolInput {
    pub arguments: HashMap<String, JsonValue>,
}

impl ToolInput {
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.arguments.get(key)
    }
}
