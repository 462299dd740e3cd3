use chrono::{DateTime, Utc};

use crate::usage::TokenUsage;

/// One generation call as persisted in the playground's history export.
#[derive(Debug, Clone)]
pub struct GenerationRecord {
    pub id: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default)]
pub struct AggregatedBucket {
    pub text_input_tokens: u64,
    pub image_input_tokens: u64,
    pub cached_input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
    pub models: Vec<String>,
    pub details: Vec<ModelBucketDetail>,
}

impl AggregatedBucket {
    /// Accumulate token counts and cost from one record's usage.
    /// Used by both the aggregation loop and the total-row computation.
    pub fn accumulate(&mut self, usage: &TokenUsage, cost: f64) {
        self.text_input_tokens += usage.text_input_tokens;
        self.image_input_tokens += usage.image_input_tokens;
        self.cached_input_tokens += usage.cached_input_tokens;
        self.output_tokens += usage.output_tokens;
        self.cost += cost;
    }

    /// Accumulate all token counts and cost from another bucket.
    pub fn accumulate_from(&mut self, other: &AggregatedBucket) {
        self.accumulate(
            &TokenUsage {
                text_input_tokens: other.text_input_tokens,
                image_input_tokens: other.image_input_tokens,
                cached_input_tokens: other.cached_input_tokens,
                output_tokens: other.output_tokens,
            },
            other.cost,
        );
    }
}

#[derive(Debug, Clone)]
pub struct ModelBucketDetail {
    pub model: String,
    pub text_input_tokens: u64,
    pub image_input_tokens: u64,
    pub cached_input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
}

impl ModelBucketDetail {
    pub fn new(model: String) -> Self {
        Self {
            model,
            text_input_tokens: 0,
            image_input_tokens: 0,
            cached_input_tokens: 0,
            output_tokens: 0,
            cost: 0.0,
        }
    }

    /// Accumulate token counts and cost into this model detail.
    pub fn accumulate(&mut self, usage: &TokenUsage, cost: f64) {
        self.text_input_tokens += usage.text_input_tokens;
        self.image_input_tokens += usage.image_input_tokens;
        self.cached_input_tokens += usage.cached_input_tokens;
        self.output_tokens += usage.output_tokens;
        self.cost += cost;
    }
}
