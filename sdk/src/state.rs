//! Agent state and running usage/cost totals
//!
//! `AgentState` is threaded through every step cycle as a value: the engine
//! reads it and returns new copies, it never mutates one in place. `usage`
//! and `cost` are optional so that a state built by hand (rather than with
//! [`AgentState::new`]) is detected by the accumulator instead of silently
//! starting from zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manifest::{ToolManifest, ToolManifestMap};
use crate::message::{ChatMessage, ToolSchema};
use crate::usage::ModelUsage;

/// Currency used for every recorded cost
pub const DEFAULT_CURRENCY: &str = "USD";

/// Lifecycle status of an agent session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    Running,
    WaitingForHumanInput,
    Done,
    Error,
}

/// Complete state of one agent session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentState {
    pub session_id: String,
    pub status: AgentStatus,
    pub step_count: u64,

    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// Tool schemas declared to the model
    #[serde(default)]
    pub tools: Vec<ToolSchema>,

    #[serde(default)]
    pub tool_manifest_map: ToolManifestMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostStats>,
}

impl AgentState {
    /// Standard initializer: zeroed usage and cost, stamped now
    pub fn new(session_id: impl Into<String>) -> Self {
        Self::new_at(session_id, Utc::now())
    }

    /// Standard initializer with an explicit creation time
    pub fn new_at(session_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            status: AgentStatus::Idle,
            step_count: 0,
            messages: Vec::new(),
            tools: Vec::new(),
            tool_manifest_map: ToolManifestMap::new(),
            usage: Some(UsageStats::default()),
            cost: Some(CostStats::new(created_at)),
        }
    }

    /// Standard initializer with a random v4 session id
    pub fn with_generated_session() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = tools;
        self
    }

    /// Register a manifest under its own identifier
    pub fn with_manifest(mut self, manifest: ToolManifest) -> Self {
        self.tool_manifest_map
            .insert(manifest.identifier.clone(), manifest);
        self
    }
}

/// Running token and call counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub llm: LlmUsage,
    pub tools: ToolsUsage,
}

impl UsageStats {
    /// Usage entry for a tool, by exact name
    pub fn tool(&self, name: &str) -> Option<&ToolUsageEntry> {
        self.tools.by_tool.iter().find(|entry| entry.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmUsage {
    pub tokens: TokenCounters,
    pub api_calls: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounters {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsUsage {
    pub total_calls: u64,
    pub total_time_ms: u64,

    /// One entry per tool name
    pub by_tool: Vec<ToolUsageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUsageEntry {
    pub name: String,
    pub calls: u64,
    pub errors: u64,
    pub total_time_ms: u64,
}

impl ToolUsageEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: 0,
            errors: 0,
            total_time_ms: 0,
        }
    }
}

/// Running monetary totals
///
/// `total` is always `llm.total + tools.total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostStats {
    pub llm: LlmCost,
    pub tools: ToolsCost,
    pub total: f64,

    /// Time of the last cost mutation
    pub calculated_at: DateTime<Utc>,
}

impl CostStats {
    pub fn new(calculated_at: DateTime<Utc>) -> Self {
        Self {
            llm: LlmCost::default(),
            tools: ToolsCost::default(),
            total: 0.0,
            calculated_at,
        }
    }

    /// Cost entry for a model, keyed `"<provider>/<model>"`
    pub fn model(&self, id: &str) -> Option<&ModelCostEntry> {
        self.llm.by_model.iter().find(|entry| entry.id == id)
    }

    /// Cost entry for a tool, by exact name
    pub fn tool(&self, name: &str) -> Option<&ToolCostEntry> {
        self.tools.by_tool.iter().find(|entry| entry.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmCost {
    pub total: f64,
    pub by_model: Vec<ModelCostEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCostEntry {
    /// `"<provider>/<model>"`
    pub id: String,
    pub provider: String,
    pub model: String,
    pub total_cost: f64,

    /// Field-wise sum of every usage delta recorded for this model
    pub usage: ModelUsage,
}

impl ModelCostEntry {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        let provider = provider.into();
        let model = model.into();
        Self {
            id: model_key(&provider, &model),
            provider,
            model,
            total_cost: 0.0,
            usage: ModelUsage::default(),
        }
    }
}

/// Key of a `byModel` entry
pub fn model_key(provider: &str, model: &str) -> String {
    format!("{}/{}", provider, model)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCost {
    pub total: f64,
    pub by_tool: Vec<ToolCostEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCostEntry {
    pub name: String,
    pub calls: u64,
    pub total_cost: f64,
    pub currency: String,
}

impl ToolCostEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: 0,
            total_cost: 0.0,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}
