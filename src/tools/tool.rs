//! Tool collaborator contract
//!
//! The policy engine never executes tools. It only needs a tool's name and its
//! capability annotations, plus the pending call's raw input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Capability hints a tool advertises about itself
///
/// Absent annotations behave as all-false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    /// The tool does not modify its environment
    #[serde(default)]
    pub read_only: bool,
    /// The tool may perform destructive updates
    #[serde(default)]
    pub destructive: bool,
    /// Repeated calls with the same input have no additional effect
    #[serde(default)]
    pub idempotent: bool,
    /// The tool edits files
    #[serde(default)]
    pub edit: bool,
    /// The tool talks to an open world of external entities
    #[serde(default)]
    pub open_world: bool,
}

impl ToolAnnotations {
    /// Annotations for a read-only tool
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Default::default()
        }
    }

    /// Annotations for a file-editing tool
    pub fn edit() -> Self {
        Self {
            edit: true,
            ..Default::default()
        }
    }
}

/// Trait for tools whose calls are gated by the permission engine
pub trait Tool: Send + Sync {
    /// Get the name of this tool
    fn name(&self) -> &str;

    /// Get the capability annotations for this tool
    fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations::default()
    }
}

/// A pending tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool use ID assigned by the model
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Raw JSON input, exactly as produced by the model
    pub input: String,
}

impl ToolCall {
    /// Create a call from raw JSON input
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input: input.into(),
        }
    }

    /// Create a call from an already-decoded input value
    pub fn from_value(id: impl Into<String>, name: impl Into<String>, input: &Value) -> Self {
        Self::new(id, name, input.to_string())
    }

    /// Decode the raw input
    pub fn decode_input(&self) -> Option<Value> {
        serde_json::from_str(&self.input).ok()
    }
}

/// A tool known only by name and annotations
///
/// Useful when the agent loop has tool metadata but no trait object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTool {
    name: String,
    annotations: ToolAnnotations,
}

impl NamedTool {
    /// Create a tool with no annotations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: ToolAnnotations::default(),
        }
    }

    /// Set the tool's annotations
    pub fn with_annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = annotations;
        self
    }
}

impl Tool for NamedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn annotations(&self) -> ToolAnnotations {
        self.annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_annotations_are_false() {
        let tool = NamedTool::new("Bash");
        assert_eq!(tool.name(), "Bash");
        assert_eq!(tool.annotations(), ToolAnnotations::default());
        assert!(!tool.annotations().read_only);
    }

    #[test]
    fn test_tool_call_decode() {
        let call = ToolCall::from_value("1", "Bash", &json!({"command": "ls"}));
        assert_eq!(call.decode_input(), Some(json!({"command": "ls"})));

        let call = ToolCall::new("2", "Bash", "{not json");
        assert_eq!(call.decode_input(), None);
    }

    #[test]
    fn test_annotations_serde() {
        let parsed: ToolAnnotations = serde_json::from_str(r#"{"readOnly": true}"#).unwrap();
        assert_eq!(parsed, ToolAnnotations::read_only());
    }
}
