//! Error types and handling
//!
//! This module provides the error types used throughout the Helm engine.
//! All errors implement the `HelmErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Failure model
//!
//! Only two errors can escape a step cycle, and both come from the usage/cost
//! accumulator:
//! - `UsageNotInitialized` when the state has no usage counters
//! - `CostNotInitialized` when a cost is supplied but the state has no cost totals
//!
//! Both are precondition violations by the caller (the state was not built with
//! `AgentState::new`). Phase dispatch and intervention evaluation never fail.

use thiserror::Error;

/// Trait for Helm error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait HelmErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors indicate a bug in how the caller built its state.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, HelmErrorExt};
///
/// let error = EngineError::UsageNotInitialized;
/// assert!(!error.is_recoverable());
/// println!("Hint: {}", error.user_hint());
///
/// let error = EngineError::Config("log_level".to_string());
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Accumulator preconditions
    #[error("Usage stats not initialized")]
    UsageNotInitialized,

    #[error("Cost stats not initialized")]
    CostNotInitialized,

    // Manifest errors
    #[error("Invalid human intervention config: {0}")]
    InvalidInterventionConfig(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl HelmErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::UsageNotInitialized => {
                "Agent state is missing usage stats. Create it with AgentState::new"
            }
            Self::CostNotInitialized => {
                "Agent state is missing cost stats. Create it with AgentState::new"
            }
            Self::InvalidInterventionConfig(_) => {
                "humanInterventionConfig must be \"always\", \"never\" or a rule list"
            }
            Self::Config(_) => "Check your config.toml file for errors",
            Self::Serialization(_) => "Input could not be decoded. Check its JSON shape",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::UsageNotInitialized | Self::CostNotInitialized => false,
            _ => true,
        }
    }
}
