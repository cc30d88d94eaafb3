//! Tool call requests emitted by the model

use serde::{Deserialize, Serialize};

/// Call type used when the model does not specify one
pub const DEFAULT_CALL_TYPE: &str = "default";

/// One tool invocation requested by the model
///
/// `identifier` keys into the state's tool manifest map; `api_name` selects
/// the operation within that manifest's API list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRequest {
    /// Unique identifier for this tool call
    pub id: String,

    /// Manifest identifier of the tool
    pub identifier: String,

    /// Operation within the manifest
    pub api_name: String,

    /// Raw arguments as produced by the model (usually a JSON object)
    pub arguments: String,

    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String,
}

fn default_call_type() -> String {
    DEFAULT_CALL_TYPE.to_string()
}

impl ToolCallRequest {
    /// Create a new tool call request with the default call type
    pub fn new(
        id: impl Into<String>,
        identifier: impl Into<String>,
        api_name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            identifier: identifier.into(),
            api_name: api_name.into(),
            arguments: arguments.into(),
            call_type: default_call_type(),
        }
    }

    /// Override the call type
    pub fn with_type(mut self, call_type: impl Into<String>) -> Self {
        self.call_type = call_type.into();
        self
    }
}
