//! Usage and cost accumulation
//!
//! Folds the usage/cost delta of one resolved model or tool call into an
//! `AgentState`. Every operation clones its input and mutates the clone; the
//! caller's state is never altered, and a failed call leaves nothing behind.
//!
//! # Preconditions
//!
//! - `state.usage` must exist, otherwise `EngineError::UsageNotInitialized`
//! - when a non-zero cost is supplied, `state.cost` must exist, otherwise
//!   `EngineError::CostNotInitialized` (model and tool paths alike)
//!
//! Counters saturate at `u64::MAX` instead of wrapping.
//!
//! A zero cost is "nothing to record": token and call counters still move,
//! but no `byModel` / `byTool` cost entry is created or touched.

use chrono::{DateTime, Utc};
use sdk::errors::EngineError;
use sdk::state::{model_key, ModelCostEntry, ToolCostEntry, ToolUsageEntry};
use sdk::{AgentState, ModelUsage};
use tracing::debug;

/// Source of `calculatedAt` timestamps
pub type Clock = fn() -> DateTime<Utc>;

/// Pure accumulator of usage and cost deltas
///
/// # Examples
///
/// ```
/// use helm_engine::accumulator::UsageCostAccumulator;
/// use sdk::{AgentState, ModelUsage};
///
/// let accumulator = UsageCostAccumulator::new();
/// let state = AgentState::new("session-1");
///
/// let usage = ModelUsage::tokens(100, 50, 150).with_cost(0.05);
/// let next = accumulator.accumulate_llm(&state, "openai", "gpt-4", &usage).unwrap();
///
/// assert_eq!(next.usage.as_ref().unwrap().llm.tokens.total, 150);
/// assert_eq!(next.cost.as_ref().unwrap().total, 0.05);
/// // The input state is untouched
/// assert_eq!(state.usage.as_ref().unwrap().llm.api_calls, 0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct UsageCostAccumulator {
    clock: Clock,
}

impl UsageCostAccumulator {
    /// Create an accumulator stamping costs with the system clock
    pub fn new() -> Self {
        Self { clock: Utc::now }
    }

    /// Create an accumulator with a custom clock
    pub fn with_clock(clock: Clock) -> Self {
        Self { clock }
    }

    /// Fold one model call into the state
    pub fn accumulate_llm(
        &self,
        state: &AgentState,
        provider: &str,
        model: &str,
        usage: &ModelUsage,
    ) -> Result<AgentState, EngineError> {
        if state.usage.is_none() {
            return Err(EngineError::UsageNotInitialized);
        }
        let billable = usage.billable_cost();
        if billable.is_some() && state.cost.is_none() {
            return Err(EngineError::CostNotInitialized);
        }

        let mut next = state.clone();

        let stats = next.usage.as_mut().ok_or(EngineError::UsageNotInitialized)?;
        let tokens = &mut stats.llm.tokens;
        tokens.input = tokens.input.saturating_add(usage.total_input_tokens.unwrap_or(0));
        tokens.output = tokens.output.saturating_add(usage.total_output_tokens.unwrap_or(0));
        tokens.total = tokens.total.saturating_add(usage.total_tokens.unwrap_or(0));
        stats.llm.api_calls = stats.llm.api_calls.saturating_add(1);

        debug!(
            "LLM usage {}/{}: +{} tokens (total {}, {} calls)",
            provider,
            model,
            usage.total_tokens.unwrap_or(0),
            tokens.total,
            stats.llm.api_calls
        );

        if let Some(amount) = billable {
            let costs = next.cost.as_mut().ok_or(EngineError::CostNotInitialized)?;
            let id = model_key(provider, model);

            let index = match costs.llm.by_model.iter().position(|e| e.id == id) {
                Some(index) => index,
                None => {
                    costs.llm.by_model.push(ModelCostEntry::new(provider, model));
                    costs.llm.by_model.len() - 1
                }
            };
            let entry = &mut costs.llm.by_model[index];
            entry.usage = entry.usage.merge(usage);
            entry.total_cost += amount;

            costs.llm.total += amount;
            costs.total += amount;
            costs.calculated_at = (self.clock)();

            debug!(
                "LLM cost {}: +{} (model {}, llm {}, total {})",
                id, amount, entry.total_cost, costs.llm.total, costs.total
            );
        }

        Ok(next)
    }

    /// Fold one tool call into the state
    pub fn accumulate_tool(
        &self,
        state: &AgentState,
        tool_name: &str,
        execution_time_ms: u64,
        success: bool,
        cost: Option<f64>,
    ) -> Result<AgentState, EngineError> {
        if state.usage.is_none() {
            return Err(EngineError::UsageNotInitialized);
        }
        let billable = cost.filter(|c| *c != 0.0 && !c.is_nan());
        if billable.is_some() && state.cost.is_none() {
            return Err(EngineError::CostNotInitialized);
        }

        let mut next = state.clone();

        let stats = next.usage.as_mut().ok_or(EngineError::UsageNotInitialized)?;
        let index = match stats.tools.by_tool.iter().position(|e| e.name == tool_name) {
            Some(index) => index,
            None => {
                stats.tools.by_tool.push(ToolUsageEntry::new(tool_name));
                stats.tools.by_tool.len() - 1
            }
        };
        let entry = &mut stats.tools.by_tool[index];
        entry.calls = entry.calls.saturating_add(1);
        entry.total_time_ms = entry.total_time_ms.saturating_add(execution_time_ms);
        if !success {
            entry.errors = entry.errors.saturating_add(1);
        }
        stats.tools.total_calls = stats.tools.total_calls.saturating_add(1);
        stats.tools.total_time_ms = stats.tools.total_time_ms.saturating_add(execution_time_ms);

        debug!(
            "Tool usage {}: {}ms success={} ({} calls, {} errors)",
            tool_name, execution_time_ms, success, entry.calls, entry.errors
        );

        if let Some(amount) = billable {
            let costs = next.cost.as_mut().ok_or(EngineError::CostNotInitialized)?;

            let index = match costs.tools.by_tool.iter().position(|e| e.name == tool_name) {
                Some(index) => index,
                None => {
                    costs.tools.by_tool.push(ToolCostEntry::new(tool_name));
                    costs.tools.by_tool.len() - 1
                }
            };
            let entry = &mut costs.tools.by_tool[index];
            entry.calls = entry.calls.saturating_add(1);
            entry.total_cost += amount;

            costs.tools.total += amount;
            costs.total += amount;
            costs.calculated_at = (self.clock)();

            debug!(
                "Tool cost {}: +{} {} (tools {}, total {})",
                tool_name, amount, entry.currency, costs.tools.total, costs.total
            );
        }

        Ok(next)
    }
}

impl Default for UsageCostAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
