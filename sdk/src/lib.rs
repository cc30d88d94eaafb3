//! Helm SDK
//!
//! Shared value types for the Helm agent engine: agent state, usage deltas,
//! tool manifests, tool call requests and the instructions a step emits.
//! This crate carries no behaviour beyond construction, lookup and merging;
//! it is used by the engine and by executors that drive it.

/// Error types and handling
pub mod errors;

/// Instructions emitted by a dispatch step
pub mod instruction;

/// Tool manifests and intervention policy types
pub mod manifest;

/// Chat turns and tool schemas
pub mod message;

/// Agent state and running totals
pub mod state;

/// Tool call requests
pub mod tool_call;

/// Model usage deltas
pub mod usage;

// Re-export commonly used types
pub use errors::{EngineError, HelmErrorExt};
pub use instruction::{FinishReason, Instruction};
pub use manifest::{
    HumanInterventionConfig, InterventionPolicy, InterventionRule, ToolApi, ToolManifest,
    ToolManifestMap,
};
pub use message::{ChatMessage, MessageRole, ToolSchema};
pub use state::{
    AgentState, AgentStatus, CostStats, ModelCostEntry, ToolCostEntry, ToolUsageEntry, UsageStats,
};
pub use tool_call::ToolCallRequest;
pub use usage::ModelUsage;
