//! Human intervention policy evaluation
//!
//! Decides whether a requested tool call must pause for human approval.
//!
//! - Unknown tool identifiers and manifests without a config resolve to `never`
//! - The tokens `always` / `never` apply to every call of the tool
//! - Rule lists are scanned in declaration order; the first rule that fires wins
//! - A rule without `match` always fires, so rules after it are unreachable
//! - If no rule fires the result is `never`
//!
//! Arguments that fail to parse as a JSON object are treated as an empty
//! argument set rather than an error: only unconditional rules can fire then.
//!
//! # Pattern matching
//!
//! Patterns and values are split on `:` and compared segment by segment.
//! A `*` segment matches any single segment; a trailing `*` also absorbs any
//! extra trailing segments of the value. `"ls:*"` matches `"ls:"` and
//! `"ls:-la:/tmp"` but not `"ls"`.
//!
//! # Examples
//!
//! ```
//! use helm_engine::intervention::{evaluate_with_manifests, matches_pattern};
//! use sdk::{
//!     HumanInterventionConfig, InterventionPolicy, InterventionRule, ToolCallRequest,
//!     ToolManifest, ToolManifestMap,
//! };
//!
//! assert!(matches_pattern("rm:*", "rm:-rf"));
//!
//! let mut manifests = ToolManifestMap::new();
//! manifests.insert(
//!     "shell".to_string(),
//!     ToolManifest::new("shell").with_intervention(HumanInterventionConfig::Rules(vec![
//!         InterventionRule::matching([("command", "ls:*")], "never"),
//!         InterventionRule::fallback("always"),
//!     ])),
//! );
//!
//! let call = ToolCallRequest::new("c1", "shell", "run", r#"{"command":"ls:-la"}"#);
//! assert_eq!(evaluate_with_manifests(&call, &manifests), InterventionPolicy::Never);
//!
//! let call = ToolCallRequest::new("c2", "shell", "run", r#"{"command":"rm:-rf"}"#);
//! assert_eq!(evaluate_with_manifests(&call, &manifests), InterventionPolicy::Always);
//! ```

use std::collections::HashMap;

use sdk::{
    AgentState, HumanInterventionConfig, InterventionPolicy, InterventionRule, ToolCallRequest,
    ToolManifestMap,
};
use tracing::{debug, warn};

const SEGMENT_SEPARATOR: char = ':';
const WILDCARD: &str = "*";

/// Evaluate the intervention policy for a tool call against the state's manifests
pub fn evaluate(tool_call: &ToolCallRequest, state: &AgentState) -> InterventionPolicy {
    evaluate_with_manifests(tool_call, &state.tool_manifest_map)
}

/// Evaluate the intervention policy for a tool call against a manifest map
pub fn evaluate_with_manifests(
    tool_call: &ToolCallRequest,
    manifests: &ToolManifestMap,
) -> InterventionPolicy {
    let Some(manifest) = manifests.get(&tool_call.identifier) else {
        // Fail-open: tools outside the registry are never gated.
        warn!(
            "No manifest for tool '{}', skipping intervention",
            tool_call.identifier
        );
        return InterventionPolicy::Never;
    };

    let policy = match &manifest.human_intervention_config {
        None | Some(HumanInterventionConfig::Never) => InterventionPolicy::Never,
        Some(HumanInterventionConfig::Always) => InterventionPolicy::Always,
        Some(HumanInterventionConfig::Rules(rules)) => {
            let args = parse_arguments(&tool_call.arguments);
            evaluate_rules(rules, &args)
        }
    };

    debug!(
        "Intervention policy for {}.{} ({}): {}",
        tool_call.identifier, tool_call.api_name, tool_call.id, policy
    );
    policy
}

/// First-match evaluation of an ordered rule list
pub fn evaluate_rules(
    rules: &[InterventionRule],
    args: &HashMap<String, String>,
) -> InterventionPolicy {
    rules
        .iter()
        .find(|rule| rule_fires(rule, args))
        .map(|rule| rule.policy.clone())
        .unwrap_or(InterventionPolicy::Never)
}

fn rule_fires(rule: &InterventionRule, args: &HashMap<String, String>) -> bool {
    rule.is_unconditional()
        || rule.match_args.iter().flatten().all(|(key, pattern)| {
            args.get(key)
                .is_some_and(|value| matches_pattern(pattern, value))
        })
}

/// Parse raw tool arguments into a key → string value record.
///
/// Non-string JSON values are rendered with their JSON text. Anything that is
/// not a JSON object yields an empty record.
pub fn parse_arguments(raw: &str) -> HashMap<String, String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect(),
        Ok(_) => {
            warn!("Tool arguments are not a JSON object, evaluating without arguments");
            HashMap::new()
        }
        Err(e) => {
            warn!(
                "Failed to parse tool arguments, evaluating without arguments: {}",
                e
            );
            HashMap::new()
        }
    }
}

/// Segment-wise wildcard match of `value` against `pattern`
pub fn matches_pattern(pattern: &str, value: &str) -> bool {
    let pattern: Vec<&str> = pattern.split(SEGMENT_SEPARATOR).collect();
    let value: Vec<&str> = value.split(SEGMENT_SEPARATOR).collect();

    for (i, segment) in pattern.iter().enumerate() {
        let is_last = i == pattern.len() - 1;

        let Some(candidate) = value.get(i) else {
            return false;
        };

        if *segment == WILDCARD {
            if is_last {
                return true;
            }
            continue;
        }

        if segment != candidate {
            return false;
        }
    }

    pattern.len() == value.len()
}
