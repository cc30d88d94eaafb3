//! Step phases and the per-step context handed to the dispatcher

use serde::{Deserialize, Serialize};
use std::fmt;

use sdk::{AgentStatus, ToolCallRequest};

/// Stage of the step cycle that just completed
///
/// Unrecognised phase strings are kept verbatim in `Unknown` so the
/// dispatcher can report them instead of failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    UserInput,
    LlmResult,
    ToolResult,
    ToolsBatchResult,
    Unknown(String),
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::UserInput => "user_input",
            Phase::LlmResult => "llm_result",
            Phase::ToolResult => "tool_result",
            Phase::ToolsBatchResult => "tools_batch_result",
            Phase::Unknown(phase) => phase,
        }
    }

    /// Phases after which it is the model's turn
    pub fn is_model_turn(&self) -> bool {
        matches!(
            self,
            Phase::UserInput | Phase::ToolResult | Phase::ToolsBatchResult
        )
    }
}

impl From<String> for Phase {
    fn from(phase: String) -> Self {
        match phase.as_str() {
            "user_input" => Phase::UserInput,
            "llm_result" => Phase::LlmResult,
            "tool_result" => Phase::ToolResult,
            "tools_batch_result" => Phase::ToolsBatchResult,
            _ => Phase::Unknown(phase),
        }
    }
}

impl From<&str> for Phase {
    fn from(phase: &str) -> Self {
        Phase::from(phase.to_string())
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.as_str().to_string()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the session as seen by the executor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub status: AgentStatus,
    pub step_count: u64,
    pub message_count: u64,
}

/// Result of the model call, present for `llm_result`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPayload {
    #[serde(default)]
    pub has_tools_calling: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    #[serde(default)]
    pub tools_calling: Vec<ToolCallRequest>,
}

impl StepPayload {
    /// Payload of a model turn that answered without tool calls
    pub fn answer(result: serde_json::Value) -> Self {
        Self {
            has_tools_calling: false,
            result: Some(result),
            tools_calling: Vec::new(),
        }
    }

    /// Payload of a model turn that requested tool calls
    pub fn tools(tools_calling: Vec<ToolCallRequest>) -> Self {
        Self {
            has_tools_calling: true,
            result: None,
            tools_calling,
        }
    }
}

/// Input of one dispatch step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepContext {
    pub phase: Phase,

    #[serde(default)]
    pub session: SessionSnapshot,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<StepPayload>,
}

impl StepContext {
    pub fn new(phase: impl Into<Phase>) -> Self {
        Self {
            phase: phase.into(),
            session: SessionSnapshot::default(),
            payload: None,
        }
    }

    pub fn with_session(mut self, session: SessionSnapshot) -> Self {
        self.session = session;
        self
    }

    pub fn with_payload(mut self, payload: StepPayload) -> Self {
        self.payload = Some(payload);
        self
    }
}
