//! Phase Dispatcher
//!
//! Decides the next instruction of the agent loop from the phase that just
//! completed and the current state. The dispatcher performs no I/O and keeps
//! no state between steps; the executor drives the loop:
//!
//! 1. Executor calls `step(context, state)`
//! 2. Executor performs the instruction (model call, tool call, approval prompt)
//! 3. Executor folds usage/cost into the state with the accumulator
//! 4. Executor builds the next context and loops until `finish`
//!
//! # Dispatch rules
//!
//! - `user_input`, `tool_result`, `tools_batch_result`: `call_llm`
//! - `llm_result` without tool calls: `finish` (completed)
//! - `llm_result` with tool calls: `request_human_approve` for the calls whose
//!   policy is `always`, otherwise `call_tool` / `call_tools_batch`
//! - anything else: `finish` (error_recovery)
//!
//! When only part of a batch needs approval, the approved calls are held back
//! with it: nothing from the batch runs until the human decides, after which
//! [`PhaseDispatcher::resume_after_approval`] yields the instruction that runs
//! the whole permitted set in its original order.

pub mod phase;

pub use phase::{Phase, SessionSnapshot, StepContext, StepPayload};

use sdk::{AgentState, Instruction, ToolCallRequest};
use tracing::{debug, info, warn};

use crate::config::AgentRuntimeConfig;
use crate::intervention;

/// A step-wise agent: one instruction per completed phase
pub trait Agent {
    fn step(&self, context: &StepContext, state: &AgentState) -> Instruction;
}

/// General-purpose agent step logic
#[derive(Debug, Clone)]
pub struct PhaseDispatcher {
    config: AgentRuntimeConfig,
}

impl PhaseDispatcher {
    /// Create a new dispatcher
    pub fn new(config: AgentRuntimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AgentRuntimeConfig {
        &self.config
    }

    /// Produce the next instruction
    ///
    /// Total: every phase, known or not, yields an instruction.
    pub fn step(&self, context: &StepContext, state: &AgentState) -> Instruction {
        debug!(
            "Session {} step {}: phase {}",
            self.config.session_id, context.session.step_count, context.phase
        );

        match &context.phase {
            phase if phase.is_model_turn() => self.call_llm(state),
            Phase::LlmResult => {
                let Some(payload) = context.payload.as_ref().filter(|p| p.has_tools_calling)
                else {
                    info!("Session {} completed", self.config.session_id);
                    return Instruction::completed();
                };
                self.dispatch_tool_calls(&payload.tools_calling, state)
            }
            phase => {
                warn!(
                    "Session {} received unknown phase '{}', finishing",
                    self.config.session_id, phase
                );
                Instruction::error_recovery(format!("Unknown phase: {}", phase))
            }
        }
    }

    /// Produce the instruction that follows a human approval decision
    ///
    /// `tools_calling` is the batch from the `llm_result` that triggered the
    /// approval request and `approved_ids` the ids the human accepted. Calls
    /// that never needed approval run together with the approved ones, in
    /// their original order. Rejected calls are dropped; if nothing is left to
    /// run it is the model's turn again.
    pub fn resume_after_approval(
        &self,
        state: &AgentState,
        tools_calling: &[ToolCallRequest],
        approved_ids: &[String],
    ) -> Instruction {
        let runnable: Vec<ToolCallRequest> = tools_calling
            .iter()
            .filter(|call| {
                approved_ids.contains(&call.id)
                    || !intervention::evaluate(call, state).requires_approval()
            })
            .cloned()
            .collect();

        debug!(
            "Session {} resuming after approval: {}/{} calls runnable",
            self.config.session_id,
            runnable.len(),
            tools_calling.len()
        );

        Instruction::for_tool_calls(runnable).unwrap_or_else(|| self.call_llm(state))
    }

    fn call_llm(&self, state: &AgentState) -> Instruction {
        Instruction::CallLlm {
            messages: state.messages.clone(),
            model: self.config.model().map(String::from),
            provider: self.config.provider().map(String::from),
            tools: state.tools.clone(),
        }
    }

    fn dispatch_tool_calls(
        &self,
        tools_calling: &[ToolCallRequest],
        state: &AgentState,
    ) -> Instruction {
        let (pending, approved): (Vec<ToolCallRequest>, Vec<ToolCallRequest>) = tools_calling
            .iter()
            .cloned()
            .partition(|call| intervention::evaluate(call, state).requires_approval());

        if !pending.is_empty() {
            info!(
                "Session {}: {} tool call(s) require approval, {} held back",
                self.config.session_id,
                pending.len(),
                approved.len()
            );
            return Instruction::request_approval(pending);
        }

        debug!(
            "Session {}: dispatching {} tool call(s)",
            self.config.session_id,
            approved.len()
        );

        // An llm_result flagged with tool calls but carrying none: nothing to
        // run, so the model gets the turn back.
        Instruction::for_tool_calls(approved).unwrap_or_else(|| self.call_llm(state))
    }
}

impl Agent for PhaseDispatcher {
    fn step(&self, context: &StepContext, state: &AgentState) -> Instruction {
        PhaseDispatcher::step(self, context, state)
    }
}
