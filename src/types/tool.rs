//! Tool definitions and invocations as exchanged with the agent host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A registered tool, as advertised in `tools/list`. Immutable once registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique within a registry.
    pub name: String,
    pub description: String,
    /// JSON Schema of the argument object.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// One `tools/call` request: a tool name and its untyped arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments: Some(arguments),
        }
    }

    /// Absent or `null` arguments bind as an empty object.
    pub fn raw_arguments(&self) -> Value {
        match &self.arguments {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(v) => v.clone(),
        }
    }
}
