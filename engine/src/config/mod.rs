//! Configuration management
//!
//! This module handles loading and validation of the Helm configuration.
//! Configuration is stored in TOML format at ~/.helm/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **agent**: Default model, provider and user for new sessions
//!
//! The dispatcher itself only sees an [`AgentRuntimeConfig`], built per
//! session with [`Config::runtime_for`]. A missing model or provider is passed
//! through to `call_llm` instructions as unset; the executor decides what an
//! unset model means.
//!
//! # Examples
//!
//! ```
//! use helm_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_toml_str(r#"
//! [core]
//! log_level = "debug"
//!
//! [agent]
//! model = "gpt-4"
//! provider = "openai"
//! "#)?;
//!
//! let runtime = config.runtime_for("session-1");
//! assert_eq!(runtime.model(), Some("gpt-4"));
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Agent defaults
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Agent defaults applied to every session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model id passed to `call_llm`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Provider id passed to `call_llm`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Model selection for `call_llm`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRuntimeConfig {
    pub model: String,
    pub provider: String,
}

/// Static configuration of one agent, as consumed by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRuntimeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_runtime_config: Option<ModelRuntimeConfig>,

    pub session_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AgentRuntimeConfig {
    /// Config with no model selected
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            model_runtime_config: None,
            session_id: session_id.into(),
            user_id: None,
        }
    }

    pub fn with_model(mut self, provider: impl Into<String>, model: impl Into<String>) -> Self {
        self.model_runtime_config = Some(ModelRuntimeConfig {
            model: model.into(),
            provider: provider.into(),
        });
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn model(&self) -> Option<&str> {
        self.model_runtime_config.as_ref().map(|c| c.model.as_str())
    }

    pub fn provider(&self) -> Option<&str> {
        self.model_runtime_config
            .as_ref()
            .map(|c| c.provider.as_str())
    }
}

impl Config {
    /// Load configuration from the default location (~/.helm/config.toml)
    ///
    /// If the configuration file doesn't exist, writes a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The home directory cannot be determined
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Serialize configuration to TOML text
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config = Self::default();
        config.validate()?;

        fs::write(path, config.to_toml_string()?)?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.helm/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".helm").join("config.toml"))
    }

    /// Validate configuration values
    ///
    /// - `log_level` must be a known tracing level
    /// - `model` and `provider` must be set together or not at all
    pub fn validate(&self) -> Result<(), EngineError> {
        if !VALID_LOG_LEVELS.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        match (&self.agent.model, &self.agent.provider) {
            (Some(_), None) => Err(EngineError::Config(
                "agent.model is set but agent.provider is missing".to_string(),
            )),
            (None, Some(_)) => Err(EngineError::Config(
                "agent.provider is set but agent.model is missing".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Dispatcher configuration for one session
    pub fn runtime_for(&self, session_id: impl Into<String>) -> AgentRuntimeConfig {
        let model_runtime_config = match (&self.agent.model, &self.agent.provider) {
            (Some(model), Some(provider)) => Some(ModelRuntimeConfig {
                model: model.clone(),
                provider: provider.clone(),
            }),
            _ => None,
        };

        AgentRuntimeConfig {
            model_runtime_config,
            session_id: session_id.into(),
            user_id: self.agent.user_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.core.log_level, "info");
        assert!(config.agent.model.is_none());
        assert!(config.agent.provider.is_none());
    }

    #[test]
    fn test_invalid_log_level() {
        let result = Config::from_toml_str("[core]\nlog_level = \"loud\"\n");
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_model_without_provider_rejected() {
        let result = Config::from_toml_str("[agent]\nmodel = \"gpt-4\"\n");
        assert!(result.is_err());

        let result = Config::from_toml_str("[agent]\nprovider = \"openai\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_runtime_for_without_model() {
        let runtime = Config::default().runtime_for("s1");
        assert_eq!(runtime.session_id, "s1");
        assert_eq!(runtime.model(), None);
        assert_eq!(runtime.provider(), None);
        assert_eq!(runtime.user_id, None);
    }

    #[test]
    fn test_runtime_for_with_model() {
        let config = Config::from_toml_str(
            "[agent]\nmodel = \"claude\"\nprovider = \"anthropic\"\nuser_id = \"u1\"\n",
        )
        .unwrap();
        let runtime = config.runtime_for("s1");
        assert_eq!(runtime.model(), Some("claude"));
        assert_eq!(runtime.provider(), Some("anthropic"));
        assert_eq!(runtime.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_runtime_config_builders() {
        let runtime = AgentRuntimeConfig::new("s")
            .with_model("openai", "gpt-4")
            .with_user("u");
        assert_eq!(runtime.provider(), Some("openai"));
        assert_eq!(runtime.model(), Some("gpt-4"));
        assert_eq!(runtime.user_id.as_deref(), Some("u"));
    }

    #[test]
    fn test_runtime_config_wire_format() {
        let runtime: AgentRuntimeConfig = serde_json::from_str(
            r#"{"sessionId":"s","modelRuntimeConfig":{"model":"m","provider":"p"}}"#,
        )
        .unwrap();
        assert_eq!(runtime.model(), Some("m"));
        assert_eq!(runtime.provider(), Some("p"));
    }
}
