//! Model usage deltas
//!
//! A `ModelUsage` is a sparse record of token counters reported by a provider
//! for one model call, plus an optional monetary cost. Fields the provider did
//! not report stay `None`, and stay `None` through merging unless the other
//! side reports them.

use serde::{Deserialize, Serialize};

/// Sparse token/cost measurement for one model invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_cached_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_cache_miss_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_write_cache_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_text_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_image_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_audio_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_citation_tokens: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_image_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_audio_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_reasoning_tokens: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_prediction_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_prediction_tokens: Option<u64>,

    /// Monetary cost of the call, in the default currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl ModelUsage {
    /// Create a usage delta with the three headline counters set
    pub fn tokens(input: u64, output: u64, total: u64) -> Self {
        Self {
            total_input_tokens: Some(input),
            total_output_tokens: Some(output),
            total_tokens: Some(total),
            ..Self::default()
        }
    }

    /// Attach a cost to this delta
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Cost worth recording: present, non-zero and a number.
    ///
    /// A zero cost means "nothing to record", not a zero-valued cost event.
    pub fn billable_cost(&self) -> Option<f64> {
        self.cost.filter(|c| *c != 0.0 && !c.is_nan())
    }

    /// Field-wise sum of two usage records.
    ///
    /// A field is present in the result iff it is present on either side;
    /// a missing side counts as zero.
    pub fn merge(&self, other: &ModelUsage) -> ModelUsage {
        ModelUsage {
            total_input_tokens: sum(self.total_input_tokens, other.total_input_tokens),
            total_output_tokens: sum(self.total_output_tokens, other.total_output_tokens),
            total_tokens: sum(self.total_tokens, other.total_tokens),
            input_cached_tokens: sum(self.input_cached_tokens, other.input_cached_tokens),
            input_cache_miss_tokens: sum(
                self.input_cache_miss_tokens,
                other.input_cache_miss_tokens,
            ),
            input_write_cache_tokens: sum(
                self.input_write_cache_tokens,
                other.input_write_cache_tokens,
            ),
            input_text_tokens: sum(self.input_text_tokens, other.input_text_tokens),
            input_image_tokens: sum(self.input_image_tokens, other.input_image_tokens),
            input_audio_tokens: sum(self.input_audio_tokens, other.input_audio_tokens),
            input_citation_tokens: sum(self.input_citation_tokens, other.input_citation_tokens),
            output_text_tokens: sum(self.output_text_tokens, other.output_text_tokens),
            output_image_tokens: sum(self.output_image_tokens, other.output_image_tokens),
            output_audio_tokens: sum(self.output_audio_tokens, other.output_audio_tokens),
            output_reasoning_tokens: sum(
                self.output_reasoning_tokens,
                other.output_reasoning_tokens,
            ),
            accepted_prediction_tokens: sum(
                self.accepted_prediction_tokens,
                other.accepted_prediction_tokens,
            ),
            rejected_prediction_tokens: sum(
                self.rejected_prediction_tokens,
                other.rejected_prediction_tokens,
            ),
            cost: match (self.cost, other.cost) {
                (None, None) => None,
                (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
            },
        }
    }
}

fn sum(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
    }
}
