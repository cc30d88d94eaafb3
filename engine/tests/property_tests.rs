//! Property-based tests for the Helm engine
//!
//! These tests verify accumulation and dispatch properties hold across
//! generated inputs.

use chrono::{DateTime, TimeZone, Utc};
use helm_engine::intervention::matches_pattern;
use helm_engine::{
    AgentRuntimeConfig, Phase, PhaseDispatcher, StepContext, StepPayload, UsageCostAccumulator,
};
use proptest::prelude::*;
use sdk::{
    AgentState, HumanInterventionConfig, Instruction, ModelUsage, ToolCallRequest, ToolManifest,
};

fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn accumulator() -> UsageCostAccumulator {
    UsageCostAccumulator::with_clock(fixed_clock)
}

fn base_state() -> AgentState {
    AgentState::new_at("prop-session", fixed_clock())
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}

// Strategy for a (provider, model) pair drawn from a small pool
fn model_strategy() -> impl Strategy<Value = (String, String)> {
    (
        prop::sample::select(vec!["openai", "anthropic"]),
        prop::sample::select(vec!["m1", "m2", "m3"]),
    )
        .prop_map(|(p, m)| (p.to_string(), m.to_string()))
}

// Strategy for one model turn: pair, input tokens, output tokens, cost in cents
fn llm_step_strategy() -> impl Strategy<Value = ((String, String), u64, u64, u32)> {
    (model_strategy(), 0u64..10_000, 0u64..10_000, 0u32..500)
}

// Strategy for one tool result: name, time, success, cost in cents
fn tool_step_strategy() -> impl Strategy<Value = (String, u64, bool, u32)> {
    (
        prop::sample::select(vec!["shell", "search", "browser"]).prop_map(String::from),
        0u64..5_000,
        any::<bool>(),
        0u32..100,
    )
}

fn cents(c: u32) -> f64 {
    f64::from(c) / 100.0
}

// Strategy for a tool call against one of three manifests
fn call_strategy() -> impl Strategy<Value = ToolCallRequest> {
    (
        "[a-z]{1,6}",
        prop::sample::select(vec!["safe", "gated", "unlisted"]),
    )
        .prop_map(|(id, identifier)| ToolCallRequest::new(id, identifier, "run", "{}"))
}

fn gated_state() -> AgentState {
    base_state()
        .with_manifest(ToolManifest::new("safe").with_intervention(HumanInterventionConfig::Never))
        .with_manifest(
            ToolManifest::new("gated").with_intervention(HumanInterventionConfig::Always),
        )
}

proptest! {
    /// Token totals equal the sum of the deltas and every model turn counts one API call
    #[test]
    fn prop_token_totals_are_sums(steps in prop::collection::vec(llm_step_strategy(), 0..20)) {
        let acc = accumulator();
        let mut state = base_state();
        let (mut input, mut output, mut total) = (0u64, 0u64, 0u64);

        for ((provider, model), i, o, _) in &steps {
            let usage = ModelUsage::tokens(*i, *o, i + o);
            state = acc.accumulate_llm(&state, provider, model, &usage).unwrap();
            input += i;
            output += o;
            total += i + o;
        }

        let usage = state.usage.unwrap_or_default();
        prop_assert_eq!(usage.llm.tokens.input, input);
        prop_assert_eq!(usage.llm.tokens.output, output);
        prop_assert_eq!(usage.llm.tokens.total, total);
        prop_assert_eq!(usage.llm.api_calls, steps.len() as u64);
    }

    /// One byModel entry per billed pair, with field-wise summed usage
    #[test]
    fn prop_one_model_entry_per_pair(steps in prop::collection::vec(llm_step_strategy(), 1..20)) {
        let acc = accumulator();
        let mut state = base_state();

        for ((provider, model), i, o, c) in &steps {
            let usage = ModelUsage::tokens(*i, *o, i + o).with_cost(cents(*c) + 0.01);
            state = acc.accumulate_llm(&state, provider, model, &usage).unwrap();
        }

        let cost = state.cost.clone().unwrap();
        let mut ids: Vec<&str> = cost.llm.by_model.iter().map(|e| e.id.as_str()).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        prop_assert_eq!(before, ids.len());

        for entry in &cost.llm.by_model {
            let matching = steps
                .iter()
                .filter(|((p, m), ..)| format!("{}/{}", p, m) == entry.id);
            let input: u64 = matching.clone().map(|(_, i, _, _)| *i).sum();
            let spent: f64 = matching.map(|(.., c)| cents(*c) + 0.01).sum();
            prop_assert_eq!(entry.usage.total_input_tokens, Some(input));
            prop_assert!(approx_eq(entry.total_cost, spent));
        }
    }

    /// The grand total is always the sum of the LLM and tool totals
    #[test]
    fn prop_cost_total_is_sum_of_parts(
        llm_steps in prop::collection::vec(llm_step_strategy(), 0..10),
        tool_steps in prop::collection::vec(tool_step_strategy(), 0..10),
    ) {
        let acc = accumulator();
        let mut state = base_state();

        for ((provider, model), i, o, c) in &llm_steps {
            let usage = ModelUsage::tokens(*i, *o, i + o).with_cost(cents(*c));
            state = acc.accumulate_llm(&state, provider, model, &usage).unwrap();
        }
        for (name, time, success, c) in &tool_steps {
            state = acc.accumulate_tool(&state, name, *time, *success, Some(cents(*c))).unwrap();
        }

        let cost = state.cost.unwrap();
        prop_assert!(approx_eq(cost.total, cost.llm.total + cost.tools.total));
    }

    /// Zero or absent cost never creates cost entries
    #[test]
    fn prop_zero_cost_creates_no_entries(
        llm_steps in prop::collection::vec(llm_step_strategy(), 0..10),
        tool_steps in prop::collection::vec(tool_step_strategy(), 0..10),
    ) {
        let acc = accumulator();
        let mut state = base_state();

        for ((provider, model), i, o, _) in &llm_steps {
            let usage = ModelUsage::tokens(*i, *o, i + o).with_cost(0.0);
            state = acc.accumulate_llm(&state, provider, model, &usage).unwrap();
        }
        for (name, time, success, _) in &tool_steps {
            state = acc.accumulate_tool(&state, name, *time, *success, None).unwrap();
        }

        let cost = state.cost.unwrap();
        prop_assert!(cost.llm.by_model.is_empty());
        prop_assert!(cost.tools.by_tool.is_empty());
        prop_assert_eq!(cost.total, 0.0);
    }

    /// Tool call counts, error counts and time add up per tool and in total
    #[test]
    fn prop_tool_usage_counts(tool_steps in prop::collection::vec(tool_step_strategy(), 0..20)) {
        let acc = accumulator();
        let mut state = base_state();

        for (name, time, success, _) in &tool_steps {
            state = acc.accumulate_tool(&state, name, *time, *success, None).unwrap();
        }

        let usage = state.usage.unwrap_or_default();
        prop_assert_eq!(usage.tools.total_calls, tool_steps.len() as u64);
        prop_assert_eq!(
            usage.tools.total_time_ms,
            tool_steps.iter().map(|(_, t, ..)| *t).sum::<u64>()
        );
        for entry in &usage.tools.by_tool {
            let calls = tool_steps.iter().filter(|(n, ..)| *n == entry.name);
            prop_assert_eq!(entry.calls, calls.clone().count() as u64);
            prop_assert_eq!(entry.errors, calls.filter(|(_, _, ok, _)| !ok).count() as u64);
        }
    }

    /// Same inputs always produce the same instruction
    #[test]
    fn prop_dispatch_is_deterministic(calls in prop::collection::vec(call_strategy(), 0..8)) {
        let dispatcher = PhaseDispatcher::new(AgentRuntimeConfig::new("prop-session"));
        let state = gated_state();
        let context = StepContext::new(Phase::LlmResult).with_payload(StepPayload::tools(calls));

        prop_assert_eq!(dispatcher.step(&context, &state), dispatcher.step(&context, &state));
    }

    /// An approval request carries exactly the gated calls, in order
    #[test]
    fn prop_approval_carries_pending_subset(calls in prop::collection::vec(call_strategy(), 1..8)) {
        let dispatcher = PhaseDispatcher::new(AgentRuntimeConfig::new("prop-session"));
        let state = gated_state();
        let context = StepContext::new(Phase::LlmResult)
            .with_payload(StepPayload::tools(calls.clone()));

        let gated: Vec<ToolCallRequest> = calls
            .iter()
            .filter(|c| c.identifier == "gated")
            .cloned()
            .collect();

        match dispatcher.step(&context, &state) {
            Instruction::RequestHumanApprove { pending_tools_calling, .. } => {
                prop_assert_eq!(pending_tools_calling, gated);
            }
            Instruction::CallTool(call) => {
                prop_assert!(gated.is_empty());
                prop_assert_eq!(vec![call], calls);
            }
            Instruction::CallToolsBatch(batch) => {
                prop_assert!(gated.is_empty());
                prop_assert_eq!(batch, calls);
            }
            other => prop_assert!(false, "unexpected instruction {:?}", other),
        }
    }

    /// A trailing wildcard matches any non-empty tail after the prefix
    #[test]
    fn prop_trailing_wildcard_matches_prefix(
        head in "[a-z]{1,8}",
        tail in "[a-z0-9:-]{0,16}",
    ) {
        let pattern = format!("{}:*", head);
        let value = format!("{}:{}", head, tail);
        prop_assert!(matches_pattern(&pattern, &value));
        prop_assert!(!matches_pattern(&pattern, &head));
    }

    /// Patterns without wildcards match only themselves
    #[test]
    fn prop_literal_pattern_is_equality(a in "[a-z:]{0,12}", b in "[a-z:]{0,12}") {
        prop_assert_eq!(matches_pattern(&a, &b), a == b);
    }
}
