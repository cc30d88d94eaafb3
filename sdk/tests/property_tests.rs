use proptest::prelude::*;
use sdk::errors::{EngineError, HelmErrorExt};
use sdk::{HumanInterventionConfig, InterventionPolicy, ModelUsage, ToolManifest};

fn usage_strategy() -> impl Strategy<Value = ModelUsage> {
    (
        prop::option::of(0u64..1_000_000),
        prop::option::of(0u64..1_000_000),
        prop::option::of(0u64..1_000_000),
        prop::option::of(0u64..1_000_000),
        prop::option::of(0u64..1_000_000),
    )
        .prop_map(|(input, output, total, cached, reasoning)| ModelUsage {
            total_input_tokens: input,
            total_output_tokens: output,
            total_tokens: total,
            input_cached_tokens: cached,
            output_reasoning_tokens: reasoning,
            ..ModelUsage::default()
        })
}

fn add(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (None, None) => None,
        _ => Some(a.unwrap_or(0) + b.unwrap_or(0)),
    }
}

proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "\\PC*") {
        let errs = vec![
            EngineError::UsageNotInitialized,
            EngineError::CostNotInitialized,
            EngineError::InvalidInterventionConfig(error_str.clone()),
            EngineError::Config(error_str.clone()),
            EngineError::Serialization(error_str.clone()),
            EngineError::Io(std::io::Error::other(error_str.clone())),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(!hint.contains("errors.rs"));
        }
    }

    #[test]
    fn test_merge_is_fieldwise_sum(a in usage_strategy(), b in usage_strategy()) {
        let merged = a.merge(&b);
        prop_assert_eq!(merged.total_input_tokens, add(a.total_input_tokens, b.total_input_tokens));
        prop_assert_eq!(
            merged.total_output_tokens,
            add(a.total_output_tokens, b.total_output_tokens)
        );
        prop_assert_eq!(merged.total_tokens, add(a.total_tokens, b.total_tokens));
        prop_assert_eq!(
            merged.input_cached_tokens,
            add(a.input_cached_tokens, b.input_cached_tokens)
        );
        prop_assert_eq!(
            merged.output_reasoning_tokens,
            add(a.output_reasoning_tokens, b.output_reasoning_tokens)
        );
        prop_assert_eq!(merged.input_audio_tokens, None);
    }

    #[test]
    fn test_merge_is_commutative(a in usage_strategy(), b in usage_strategy()) {
        prop_assert_eq!(a.merge(&b), b.merge(&a));
    }

    #[test]
    fn test_merge_with_empty_is_identity(a in usage_strategy()) {
        prop_assert_eq!(a.merge(&ModelUsage::default()), a.clone());
    }

    #[test]
    fn test_unknown_policy_token_is_rejected(token in "[a-z]{1,12}") {
        prop_assume!(token != "always" && token != "never");
        let json = format!(
            r#"{{"identifier":"tool","humanInterventionConfig":"{}"}}"#,
            token
        );
        prop_assert!(ToolManifest::from_json(&json).is_err());
    }

    #[test]
    fn test_rule_policy_tokens_survive_round_trip(token in "[a-z]{1,12}") {
        let json = format!(
            r#"{{"identifier":"tool","humanInterventionConfig":[{{"match":{{"cmd":"x:*"}},"policy":"{}"}}]}}"#,
            token
        );
        let manifest = ToolManifest::from_json(&json).unwrap();
        let Some(HumanInterventionConfig::Rules(rules)) = &manifest.human_intervention_config else {
            return Err(TestCaseError::fail("expected rule list"));
        };
        prop_assert_eq!(&rules[0].policy, &InterventionPolicy::from(token.as_str()));

        let reparsed = ToolManifest::from_json(&manifest.to_json().unwrap()).unwrap();
        prop_assert_eq!(reparsed, manifest);
    }
}
