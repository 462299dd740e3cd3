use std::collections::{BTreeMap, HashMap};

use crate::cli::Command;
use crate::cost;
use crate::pricing::{pricing_for, ModelId};
use crate::types::{AggregatedBucket, GenerationRecord, ModelBucketDetail};
use crate::usage::TokenUsage;

/// Shorten model names for display: strip the `gpt-` prefix.
/// "gpt-image-1-mini" → "image-1-mini"
pub fn short_model_name(model: &str) -> String {
    model.strip_prefix("gpt-").unwrap_or(model).to_string()
}

/// Bucket key for grouping records.
pub fn bucket_key(record: &GenerationRecord, mode: &Command) -> String {
    match mode {
        Command::Daily => record.timestamp.format("%Y-%m-%d").to_string(),
        Command::Monthly => record.timestamp.format("%Y-%m").to_string(),
        Command::Model => record.model.clone(),
        Command::Estimate { .. } => "estimate".to_string(),
    }
}

/// Per-key state accumulated during the hot loop, bundled to avoid
/// maintaining parallel maps keyed by the same string.
#[derive(Default)]
struct BucketState {
    bucket: AggregatedBucket,
    model_details: HashMap<String, ModelBucketDetail>,
}

pub fn aggregate(
    records: &[GenerationRecord],
    mode: &Command,
) -> BTreeMap<String, AggregatedBucket> {
    let mut states: HashMap<String, BucketState> = HashMap::new();

    for r in records {
        let key = bucket_key(r, mode);
        // Unrounded per-record cost; rounding happens once at display time.
        let record_cost = pricing_for(ModelId::parse(&r.model)).cost_for(&r.usage);

        let state = states.entry(key).or_default();
        state.bucket.accumulate(&r.usage, record_cost);

        let detail = state
            .model_details
            .entry(r.model.clone())
            .or_insert_with(|| ModelBucketDetail::new(r.model.clone()));
        detail.accumulate(&r.usage, record_cost);
    }

    // Flatten BucketState into AggregatedBucket
    states
        .into_iter()
        .map(|(key, state)| {
            let mut bucket = state.bucket;

            let mut details: Vec<ModelBucketDetail> = state.model_details.into_values().collect();
            details.sort_by(|a, b| {
                b.cost
                    .partial_cmp(&a.cost)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            bucket.models = details.iter().map(|d| short_model_name(&d.model)).collect();
            bucket.details = details;

            (key, bucket)
        })
        .collect()
}

/// The breakdown of a whole bucket, reusing the per-call estimator so the
/// JSON output carries the same field names as a single estimate.
pub fn bucket_breakdown(bucket: &AggregatedBucket) -> cost::CostBreakdown {
    let usage = TokenUsage {
        text_input_tokens: bucket.text_input_tokens,
        image_input_tokens: bucket.image_input_tokens,
        cached_input_tokens: bucket.cached_input_tokens,
        output_tokens: bucket.output_tokens,
    };
    cost::CostBreakdown {
        estimated_cost_usd: cost::round4(bucket.cost),
        text_input_tokens: usage.text_input_tokens,
        image_input_tokens: usage.image_input_tokens,
        cached_input_tokens: usage.cached_input_tokens,
        billable_input_tokens: cost::billable_input_tokens(&usage),
        image_output_tokens: usage.output_tokens,
    }
}
