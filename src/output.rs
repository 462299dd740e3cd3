use std::collections::BTreeMap;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};

use crate::aggregate::bucket_breakdown;
use crate::types::{AggregatedBucket, ModelBucketDetail};

fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn format_cost(cost: f64) -> String {
    format!("${:.4}", cost)
}

fn column_header(col: &str) -> &str {
    match col {
        "period" => "Period",
        "text_in" => "Text In",
        "image_in" => "Image In",
        "cached" => "Cached",
        "billable" => "Billable",
        "output" => "Output",
        "cost" => "Cost",
        "models" => "Models",
        other => other,
    }
}

fn bucket_cell(col: &str, key: &str, bucket: &AggregatedBucket) -> Cell {
    let billable = bucket_breakdown(bucket).billable_input_tokens;
    match col {
        "period" => Cell::new(key),
        "text_in" => Cell::new(format_tokens(bucket.text_input_tokens)),
        "image_in" => Cell::new(format_tokens(bucket.image_input_tokens)),
        "cached" => Cell::new(format_tokens(bucket.cached_input_tokens)),
        "billable" => Cell::new(format_tokens(billable)),
        "output" => Cell::new(format_tokens(bucket.output_tokens)),
        "cost" => Cell::new(format_cost(bucket.cost)),
        "models" => Cell::new(bucket.models.join(", ")),
        _ => Cell::new(""),
    }
}

fn detail_cell(col: &str, detail: &ModelBucketDetail) -> Cell {
    match col {
        "period" => Cell::new(format!("  {}", detail.model)),
        "text_in" => Cell::new(format_tokens(detail.text_input_tokens)),
        "image_in" => Cell::new(format_tokens(detail.image_input_tokens)),
        "cached" => Cell::new(format_tokens(detail.cached_input_tokens)),
        "output" => Cell::new(format_tokens(detail.output_tokens)),
        "cost" => Cell::new(format_cost(detail.cost)),
        _ => Cell::new(""),
    }
}

pub fn print_table(
    buckets: &BTreeMap<String, AggregatedBucket>,
    columns: &[String],
    breakdown: bool,
) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(columns.iter().map(|c| Cell::new(column_header(c))));

    let mut totals = AggregatedBucket::default();

    for (key, bucket) in buckets {
        table.add_row(columns.iter().map(|c| bucket_cell(c, key, bucket)));

        if breakdown {
            for detail in &bucket.details {
                table.add_row(columns.iter().map(|c| detail_cell(c, detail)));
            }
        }

        totals.accumulate_from(bucket);
    }

    table.add_row(columns.iter().map(|c| bucket_cell(c, "TOTAL", &totals)));

    println!("{table}");
}

pub fn print_json(buckets: &BTreeMap<String, AggregatedBucket>) {
    let out: BTreeMap<&String, serde_json::Value> = buckets
        .iter()
        .map(|(key, bucket)| {
            let mut v = serde_json::to_value(bucket_breakdown(bucket)).unwrap_or_default();
            if let Some(obj) = v.as_object_mut() {
                obj.insert("models".to_string(), bucket.models.clone().into());
            }
            (key, v)
        })
        .collect();

    match serde_json::to_string_pretty(&out) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_formatting() {
        assert_eq!(format_tokens(999), "999");
        assert_eq!(format_tokens(1_500), "1.5K");
        assert_eq!(format_tokens(2_300_000), "2.3M");
    }

    #[test]
    fn cost_formatting_shows_four_decimals() {
        assert_eq!(format_cost(0.0009), "$0.0009");
        assert_eq!(format_cost(1.0), "$1.0000");
    }
}
