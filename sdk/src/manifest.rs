//! Tool manifests and human intervention policy types
//!
//! A manifest is the static description of a tool supplied by the tool
//! registry. Its optional `humanInterventionConfig` decides whether a call
//! must pause for approval. On the wire the config is either the token
//! `"always"`/`"never"` or an ordered rule list; it is decoded once, at load
//! time, into [`HumanInterventionConfig`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::errors::EngineError;

/// Mapping from tool identifier to its manifest
pub type ToolManifestMap = HashMap<String, ToolManifest>;

/// Static metadata describing a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolManifest {
    pub identifier: String,

    #[serde(default)]
    pub api: Vec<ToolApi>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_intervention_config: Option<HumanInterventionConfig>,
}

impl ToolManifest {
    /// Create a manifest with no APIs and no intervention config
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            api: Vec::new(),
            human_intervention_config: None,
        }
    }

    /// Add an API entry
    pub fn with_api(mut self, api: ToolApi) -> Self {
        self.api.push(api);
        self
    }

    /// Set the human intervention config
    pub fn with_intervention(mut self, config: HumanInterventionConfig) -> Self {
        self.human_intervention_config = Some(config);
        self
    }

    /// Get an API entry by name
    pub fn get_api(&self, name: &str) -> Option<&ToolApi> {
        self.api.iter().find(|api| api.name == name)
    }

    /// Parse manifest from JSON string
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize manifest to JSON string
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One operation exposed by a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolApi {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl ToolApi {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameters: serde_json::Value::Null,
        }
    }
}

/// Outcome of intervention evaluation
///
/// `Always` means the call must pause for human approval. Rule lists may carry
/// tokens other than `always`/`never`; those are kept verbatim in `Other` and
/// do not gate the call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InterventionPolicy {
    Always,
    Never,
    Other(String),
}

impl InterventionPolicy {
    /// Whether the call must wait for a human
    pub fn requires_approval(&self) -> bool {
        matches!(self, InterventionPolicy::Always)
    }

    pub fn as_str(&self) -> &str {
        match self {
            InterventionPolicy::Always => "always",
            InterventionPolicy::Never => "never",
            InterventionPolicy::Other(token) => token,
        }
    }
}

impl From<String> for InterventionPolicy {
    fn from(token: String) -> Self {
        match token.as_str() {
            "always" => InterventionPolicy::Always,
            "never" => InterventionPolicy::Never,
            _ => InterventionPolicy::Other(token),
        }
    }
}

impl From<&str> for InterventionPolicy {
    fn from(token: &str) -> Self {
        InterventionPolicy::from(token.to_string())
    }
}

impl From<InterventionPolicy> for String {
    fn from(policy: InterventionPolicy) -> Self {
        policy.as_str().to_string()
    }
}

impl fmt::Display for InterventionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a rule-based intervention config
///
/// A rule without `match` is an unconditional fallback. Otherwise every key
/// of `match` must be present in the call arguments and satisfy its pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionRule {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_args: Option<BTreeMap<String, String>>,

    pub policy: InterventionPolicy,
}

impl InterventionRule {
    /// Rule that fires for every call
    pub fn fallback(policy: impl Into<InterventionPolicy>) -> Self {
        Self {
            match_args: None,
            policy: policy.into(),
        }
    }

    /// Rule that fires when every `(key, pattern)` pair matches
    pub fn matching<K, P>(
        patterns: impl IntoIterator<Item = (K, P)>,
        policy: impl Into<InterventionPolicy>,
    ) -> Self
    where
        K: Into<String>,
        P: Into<String>,
    {
        Self {
            match_args: Some(
                patterns
                    .into_iter()
                    .map(|(k, p)| (k.into(), p.into()))
                    .collect(),
            ),
            policy: policy.into(),
        }
    }

    pub fn is_unconditional(&self) -> bool {
        self.match_args.is_none()
    }
}

/// Decoded `humanInterventionConfig`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInterventionConfig", into = "RawInterventionConfig")]
pub enum HumanInterventionConfig {
    Always,
    Never,
    Rules(Vec<InterventionRule>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawInterventionConfig {
    Token(String),
    Rules(Vec<InterventionRule>),
}

impl TryFrom<RawInterventionConfig> for HumanInterventionConfig {
    type Error = EngineError;

    fn try_from(raw: RawInterventionConfig) -> Result<Self, Self::Error> {
        match raw {
            RawInterventionConfig::Token(token) => match token.as_str() {
                "always" => Ok(HumanInterventionConfig::Always),
                "never" => Ok(HumanInterventionConfig::Never),
                other => Err(EngineError::InvalidInterventionConfig(format!(
                    "unknown policy token '{}'",
                    other
                ))),
            },
            RawInterventionConfig::Rules(rules) => Ok(HumanInterventionConfig::Rules(rules)),
        }
    }
}

impl From<HumanInterventionConfig> for RawInterventionConfig {
    fn from(config: HumanInterventionConfig) -> Self {
        match config {
            HumanInterventionConfig::Always => RawInterventionConfig::Token("always".to_string()),
            HumanInterventionConfig::Never => RawInterventionConfig::Token("never".to_string()),
            HumanInterventionConfig::Rules(rules) => RawInterventionConfig::Rules(rules),
        }
    }
}
