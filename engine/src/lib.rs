//! Helm Engine Library
//!
//! Decision core of a step-wise LLM agent: phase dispatch, human intervention
//! policy evaluation and usage/cost accumulation. Model calls, tool execution
//! and persistence belong to the executor that drives this library.

/// Configuration management module
pub mod config;

/// Usage and cost accumulation
pub mod accumulator;

/// Human intervention policy evaluation
pub mod intervention;

/// Phase dispatch (agent step logic)
pub mod dispatcher;

/// Telemetry and Observability
pub mod telemetry;

pub use accumulator::UsageCostAccumulator;
pub use config::{AgentRuntimeConfig, Config, ModelRuntimeConfig};
pub use dispatcher::{Agent, Phase, PhaseDispatcher, SessionSnapshot, StepContext, StepPayload};
