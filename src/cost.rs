use serde::Serialize;
use serde_json::Value;

use crate::pricing::{pricing_for, ModelId};
use crate::usage::{parse_usage, InvalidUsageData, TokenUsage};

/// How a model's cache discount is applied to the input pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDiscount {
    /// Cached tokens offset the text pool only; image input is billed in
    /// full. Excess cached tokens never eat into the image pool.
    TextOnly,
    /// Text and image input share one blended rate; cached tokens offset
    /// the combined pool.
    CombinedPool,
}

/// Per-token USD rates for one model.
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    pub text_input_cost_per_token: f64,
    pub image_input_cost_per_token: f64,
    pub cached_input_cost_per_token: f64,
    pub image_output_cost_per_token: f64,
    pub cache_discount: CacheDiscount,
}

impl ModelPricing {
    /// Unrounded cost of a usage record under this pricing row. Used by the
    /// aggregation path, which sums many records before formatting.
    pub fn cost_for(&self, u: &TokenUsage) -> f64 {
        let input_cost = match self.cache_discount {
            CacheDiscount::TextOnly => {
                let effective_text = u.text_input_tokens.saturating_sub(u.cached_input_tokens);
                effective_text as f64 * self.text_input_cost_per_token
                    + u.image_input_tokens as f64 * self.image_input_cost_per_token
            }
            CacheDiscount::CombinedPool => {
                billable_input_tokens(u) as f64 * self.text_input_cost_per_token
            }
        };

        input_cost
            + u.cached_input_tokens as f64 * self.cached_input_cost_per_token
            + u.output_tokens as f64 * self.image_output_cost_per_token
    }
}

/// Chargeable input after the cache discount, floored at zero. Reported in
/// every breakdown regardless of the model's discount policy.
pub fn billable_input_tokens(u: &TokenUsage) -> u64 {
    (u.text_input_tokens + u.image_input_tokens).saturating_sub(u.cached_input_tokens)
}

/// Cost estimate for a single generation call, in the shape the playground
/// attaches to each history entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub estimated_cost_usd: f64,
    pub text_input_tokens: u64,
    pub image_input_tokens: u64,
    pub cached_input_tokens: u64,
    pub billable_input_tokens: u64,
    pub image_output_tokens: u64,
}

/// Round to 4 decimal places, half away from zero. This is the externally
/// observable precision of every estimate.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Estimate the cost of a validated usage record. Pure and total: no I/O,
/// no clock, same input always yields the bit-identical breakdown.
pub fn estimate(usage: &TokenUsage, model: ModelId) -> CostBreakdown {
    let pricing = pricing_for(model);
    CostBreakdown {
        estimated_cost_usd: round4(pricing.cost_for(usage)),
        text_input_tokens: usage.text_input_tokens,
        image_input_tokens: usage.image_input_tokens,
        cached_input_tokens: usage.cached_input_tokens,
        billable_input_tokens: billable_input_tokens(usage),
        image_output_tokens: usage.output_tokens,
    }
}

/// Estimate straight from the provider's (untrusted) usage payload.
/// Shape errors come back as [`InvalidUsageData`]; callers log and omit the
/// cost display rather than failing the whole response.
pub fn estimate_value(
    usage: Option<&Value>,
    model: ModelId,
) -> Result<CostBreakdown, InvalidUsageData> {
    let usage = parse_usage(usage)?;
    Ok(estimate(&usage, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn usage(text: u64, image: u64, cached: u64, output: u64) -> TokenUsage {
        TokenUsage {
            text_input_tokens: text,
            image_input_tokens: image,
            cached_input_tokens: cached,
            output_tokens: output,
        }
    }

    #[test]
    fn text_only_scenario_on_default_model() {
        // 100 text tokens in, 10 image tokens out on gpt-image-1:
        // 100 * $5/M + 10 * $40/M = $0.0009
        let b = estimate(&usage(100, 0, 0, 10), ModelId::GptImage1);
        assert_eq!(b.billable_input_tokens, 100);
        assert_eq!(b.estimated_cost_usd, 0.0009);
    }

    #[test]
    fn combined_pool_discount() {
        // 50 text + 20 image - 30 cached = 40 billable on gpt-image-1.5:
        // 40 * $6/M + 30 * $0.60/M = 0.000258 -> 0.0003
        let b = estimate(&usage(50, 20, 30, 0), ModelId::GptImage15);
        assert_eq!(b.billable_input_tokens, 40);
        assert_eq!(b.estimated_cost_usd, 0.0003);
    }

    #[test]
    fn unknown_model_uses_default_rates() {
        let v = json!({
            "input_tokens_details": { "text_tokens": 100 },
            "output_tokens": 10
        });
        let b = estimate_value(Some(&v), ModelId::parse("imaginary-model")).unwrap();
        assert_eq!(b, estimate(&usage(100, 0, 0, 10), ModelId::DEFAULT));
    }

    #[test]
    fn text_only_discount_never_touches_image_pool() {
        // Cached exceeds text by 20: the text pool clamps to 0 and the
        // excess is not applied against the 50 image tokens.
        // 50 * $10/M + 30 * $1.25/M = 0.0005375 -> 0.0005
        let a = estimate(&usage(10, 50, 30, 0), ModelId::GptImage1);
        assert_eq!(a.estimated_cost_usd, 0.0005);
        // Same image cost as when the text pool is merely exhausted.
        let b = estimate(&usage(30, 50, 30, 0), ModelId::GptImage1);
        assert_eq!(b.estimated_cost_usd, a.estimated_cost_usd);
    }

    #[test]
    fn billable_floor_is_zero() {
        let b = estimate(&usage(5, 5, 100, 0), ModelId::GptImage15);
        assert_eq!(b.billable_input_tokens, 0);
        assert!(b.estimated_cost_usd >= 0.0);
    }

    #[test]
    fn cost_is_never_negative() {
        for model in [
            ModelId::GptImage1,
            ModelId::GptImage1Mini,
            ModelId::GptImage15,
        ] {
            for u in [
                usage(0, 0, 0, 0),
                usage(0, 0, 1_000_000, 0),
                usage(1, 1, 1_000_000_000, 1),
            ] {
                assert!(estimate(&u, model).estimated_cost_usd >= 0.0);
            }
        }
    }

    #[test]
    fn idempotent() {
        let u = usage(123, 456, 78, 9);
        let a = estimate(&u, ModelId::GptImage1Mini);
        let b = estimate(&u, ModelId::GptImage1Mini);
        assert_eq!(a, b);
        assert_eq!(
            a.estimated_cost_usd.to_bits(),
            b.estimated_cost_usd.to_bits()
        );
    }

    #[test]
    fn monotone_in_fresh_token_counts() {
        // Raising text, image, or output counts never lowers the estimate.
        // (Raising the cached count lowers it; that's the discount.)
        let base = usage(100, 50, 20, 10);
        for model in [
            ModelId::GptImage1,
            ModelId::GptImage1Mini,
            ModelId::GptImage15,
        ] {
            let c0 = estimate(&base, model).estimated_cost_usd;
            assert!(estimate(&usage(1100, 50, 20, 10), model).estimated_cost_usd >= c0);
            assert!(estimate(&usage(100, 1050, 20, 10), model).estimated_cost_usd >= c0);
            assert!(estimate(&usage(100, 50, 20, 1010), model).estimated_cost_usd >= c0);
        }
    }

    #[test]
    fn invalid_payloads_stay_invalid_for_every_model() {
        for model in [
            ModelId::GptImage1,
            ModelId::GptImage1Mini,
            ModelId::GptImage15,
        ] {
            assert!(estimate_value(None, model).is_err());
            let no_output = json!({ "input_tokens_details": {} });
            assert!(estimate_value(Some(&no_output), model).is_err());
        }
    }

    #[test]
    fn rounds_to_four_decimals() {
        // 134 text tokens at $5/M = 0.00067 -> 0.0007.
        let b = estimate(&usage(134, 0, 0, 0), ModelId::GptImage1);
        assert_eq!(b.estimated_cost_usd, 0.0007);
        // 126 * $5/M = 0.00063 -> 0.0006.
        let b = estimate(&usage(126, 0, 0, 0), ModelId::GptImage1);
        assert_eq!(b.estimated_cost_usd, 0.0006);
    }

    #[test]
    fn breakdown_serializes_with_wire_names() {
        let b = estimate(&usage(10, 2, 1, 3), ModelId::GptImage1);
        let v = serde_json::to_value(b).unwrap();
        for key in [
            "estimated_cost_usd",
            "text_input_tokens",
            "image_input_tokens",
            "cached_input_tokens",
            "billable_input_tokens",
            "image_output_tokens",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
    }
}
