use serde_json::Value;

/// Rejection sentinel for a usage payload whose shape we cannot trust:
/// the object is missing, `output_tokens` is missing, or a token field is
/// present but not a non-negative integer. Callers skip cost display for
/// the record; this is never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidUsageData;

impl std::fmt::Display for InvalidUsageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid usage data")
    }
}

impl std::error::Error for InvalidUsageData {}

/// Validated token counts for one generation call, as reported by the
/// provider under `usage` in the API response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub text_input_tokens: u64,
    pub image_input_tokens: u64,
    pub cached_input_tokens: u64,
    pub output_tokens: u64,
}

/// Read an optional token field: absent (or null) defaults to 0, but a value
/// that is present and not a non-negative integer is a shape error. The
/// distinction matters — the provider omits detail fields it didn't charge,
/// while a string or negative number means we misread the response.
fn token_field(obj: &Value, key: &str) -> Result<u64, InvalidUsageData> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v.as_u64().ok_or(InvalidUsageData),
    }
}

/// Parse the provider's usage payload:
///
/// ```json
/// { "input_tokens_details": { "text_tokens": 100, "image_tokens": 0, "cached_tokens": 0 },
///   "output_tokens": 10 }
/// ```
///
/// `output_tokens` is required; everything under `input_tokens_details`
/// (including the object itself) defaults to 0 when absent.
pub fn parse_usage(usage: Option<&Value>) -> Result<TokenUsage, InvalidUsageData> {
    let usage = match usage {
        Some(v @ Value::Object(_)) => v,
        _ => return Err(InvalidUsageData),
    };

    let output_tokens = usage
        .get("output_tokens")
        .and_then(Value::as_u64)
        .ok_or(InvalidUsageData)?;

    let (text, image, cached) = match usage.get("input_tokens_details") {
        None | Some(Value::Null) => (0, 0, 0),
        Some(details @ Value::Object(_)) => (
            token_field(details, "text_tokens")?,
            token_field(details, "image_tokens")?,
            token_field(details, "cached_tokens")?,
        ),
        Some(_) => return Err(InvalidUsageData),
    };

    Ok(TokenUsage {
        text_input_tokens: text,
        image_input_tokens: image,
        cached_input_tokens: cached,
        output_tokens,
    })
}
