//! Instructions emitted by one dispatch step
//!
//! Wire shape is adjacently tagged: `{"type": "call_tool", "payload": {...}}`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::message::{ChatMessage, ToolSchema};
use crate::tool_call::ToolCallRequest;

/// Reason attached to approval requests
pub const APPROVAL_REASON: &str = "Tools require human approval";

/// Detail attached to a successful finish
pub const COMPLETED_DETAIL: &str = "General agent completed successfully";

/// What the external executor must do next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Instruction {
    /// Call the model with the full conversation
    CallLlm {
        messages: Vec<ChatMessage>,
        model: Option<String>,
        provider: Option<String>,
        tools: Vec<ToolSchema>,
    },

    /// Run a single tool call
    CallTool(ToolCallRequest),

    /// Run independent tool calls; the executor may run them concurrently
    CallToolsBatch(Vec<ToolCallRequest>),

    /// Pause until a human approves the listed calls
    #[serde(rename_all = "camelCase")]
    RequestHumanApprove {
        pending_tools_calling: Vec<ToolCallRequest>,
        reason: String,
    },

    /// Stop the loop
    #[serde(rename_all = "camelCase")]
    Finish {
        reason: FinishReason,
        reason_detail: String,
    },
}

impl Instruction {
    /// Execution instruction for tool calls that need no approval.
    ///
    /// One call runs alone, more run as a batch in their original order.
    /// Returns `None` for an empty list.
    pub fn for_tool_calls(mut calls: Vec<ToolCallRequest>) -> Option<Self> {
        match calls.len() {
            0 => None,
            1 => calls.pop().map(Instruction::CallTool),
            _ => Some(Instruction::CallToolsBatch(calls)),
        }
    }

    pub fn request_approval(pending: Vec<ToolCallRequest>) -> Self {
        Instruction::RequestHumanApprove {
            pending_tools_calling: pending,
            reason: APPROVAL_REASON.to_string(),
        }
    }

    pub fn completed() -> Self {
        Instruction::Finish {
            reason: FinishReason::Completed,
            reason_detail: COMPLETED_DETAIL.to_string(),
        }
    }

    pub fn error_recovery(detail: impl Into<String>) -> Self {
        Instruction::Finish {
            reason: FinishReason::ErrorRecovery,
            reason_detail: detail.into(),
        }
    }

    /// Wire tag of this instruction
    pub fn kind(&self) -> &'static str {
        match self {
            Instruction::CallLlm { .. } => "call_llm",
            Instruction::CallTool(_) => "call_tool",
            Instruction::CallToolsBatch(_) => "call_tools_batch",
            Instruction::RequestHumanApprove { .. } => "request_human_approve",
            Instruction::Finish { .. } => "finish",
        }
    }

    /// Whether the step loop ends here
    pub fn is_terminal(&self) -> bool {
        matches!(self, Instruction::Finish { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Completed,
    ErrorRecovery,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Completed => write!(f, "completed"),
            FinishReason::ErrorRecovery => write!(f, "error_recovery"),
        }
    }
}
