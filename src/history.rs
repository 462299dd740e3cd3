use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde_json::Value;
use walkdir::WalkDir;

use crate::types::GenerationRecord;
use crate::usage::parse_usage;

/// Discover history files under `root`. The playground exports one `.json`
/// file per session (an array of records) or appends to `.jsonl` logs; we
/// accept both.
pub fn discover_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let ext = entry.path().extension().and_then(|e| e.to_str());
        if matches!(ext, Some("json") | Some("jsonl")) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    files
}

/// Parse every discovered file in parallel and flatten the records.
/// Unreadable files and malformed records are skipped, not fatal.
pub fn load_records(files: &[PathBuf]) -> Vec<GenerationRecord> {
    files
        .par_iter()
        .map(|path| parse_file(path))
        .reduce(Vec::new, |mut acc, mut records| {
            acc.append(&mut records);
            acc
        })
}

fn parse_file(path: &Path) -> Vec<GenerationRecord> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(_) => return Vec::new(),
    };

    if path.extension().is_some_and(|e| e == "jsonl") {
        data.lines().filter_map(extract_record_line).collect()
    } else {
        match serde_json::from_str::<Value>(&data) {
            Ok(Value::Array(items)) => items.iter().filter_map(extract_record).collect(),
            Ok(ref single) => extract_record(single).into_iter().collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn extract_record_line(line: &str) -> Option<GenerationRecord> {
    // Fast pre-filter before paying for a full JSON parse.
    if !line.contains("\"usage\"") {
        return None;
    }
    let value: Value = serde_json::from_str(line).ok()?;
    extract_record(&value)
}

/// Pull one record out of a JSON value:
///
/// ```json
/// { "id": "gen_abc", "model": "gpt-image-1", "created_at": 1755600000000,
///   "usage": { "input_tokens_details": {...}, "output_tokens": 10 } }
/// ```
///
/// `created_at` is a millisecond epoch, as written by the browser.
fn extract_record(value: &Value) -> Option<GenerationRecord> {
    let id = value.get("id")?.as_str()?.to_string();
    let model = value.get("model")?.as_str()?.to_string();

    let created_at = value.get("created_at")?.as_i64()?;
    let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis(created_at)?;

    // Records with an unusable usage payload carry no billable information;
    // drop them here rather than aggregating zeros.
    let usage = parse_usage(value.get("usage")).ok()?;

    Some(GenerationRecord {
        id,
        model,
        timestamp,
        usage,
    })
}
