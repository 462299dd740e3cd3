use crate::cost::{CacheDiscount, ModelPricing};

/// The image models we can price. The provider's usage payloads carry the
/// model as a free-form string; anything we don't recognize is billed at the
/// default model's rates rather than rejected (the upstream API adds model
/// aliases faster than we ship releases).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelId {
    GptImage1,
    GptImage1Mini,
    GptImage15,
}

impl ModelId {
    pub const DEFAULT: ModelId = ModelId::GptImage1;

    /// Parse a provider model string. Unknown identifiers fall back to
    /// [`ModelId::DEFAULT`]; this must never fail.
    pub fn parse(s: &str) -> ModelId {
        match s.trim() {
            "gpt-image-1" => ModelId::GptImage1,
            "gpt-image-1-mini" => ModelId::GptImage1Mini,
            "gpt-image-1.5" => ModelId::GptImage15,
            _ => ModelId::DEFAULT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::GptImage1 => "gpt-image-1",
            ModelId::GptImage1Mini => "gpt-image-1-mini",
            ModelId::GptImage15 => "gpt-image-1.5",
        }
    }
}

const MTOK: f64 = 1_000_000.0;

// Rates are USD per token, written as per-million over MTOK to stay legible
// against the vendor's published price sheet.
//
// gpt-image-1 and gpt-image-1-mini price text and image input separately and
// apply the cache discount to the text pool only. gpt-image-1.5 bills a
// single blended input rate over the combined pool.
const GPT_IMAGE_1: ModelPricing = ModelPricing {
    text_input_cost_per_token: 5.0 / MTOK,
    image_input_cost_per_token: 10.0 / MTOK,
    cached_input_cost_per_token: 1.25 / MTOK,
    image_output_cost_per_token: 40.0 / MTOK,
    cache_discount: CacheDiscount::TextOnly,
};

const GPT_IMAGE_1_MINI: ModelPricing = ModelPricing {
    text_input_cost_per_token: 2.0 / MTOK,
    image_input_cost_per_token: 2.5 / MTOK,
    cached_input_cost_per_token: 0.2 / MTOK,
    image_output_cost_per_token: 8.0 / MTOK,
    cache_discount: CacheDiscount::TextOnly,
};

const GPT_IMAGE_1_5: ModelPricing = ModelPricing {
    text_input_cost_per_token: 6.0 / MTOK,
    image_input_cost_per_token: 6.0 / MTOK,
    cached_input_cost_per_token: 0.6 / MTOK,
    image_output_cost_per_token: 30.0 / MTOK,
    cache_discount: CacheDiscount::CombinedPool,
};

/// Look up the pricing row for a model. Total over the closed enum, so the
/// table can never be out of sync with [`ModelId`].
pub fn pricing_for(model: ModelId) -> &'static ModelPricing {
    match model {
        ModelId::GptImage1 => &GPT_IMAGE_1,
        ModelId::GptImage1Mini => &GPT_IMAGE_1_MINI,
        ModelId::GptImage15 => &GPT_IMAGE_1_5,
    }
}
