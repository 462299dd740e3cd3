use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "iku",
    about = "Token usage and cost tracker for image-generation history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// History directory to scan (overrides config)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Start date filter (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub from: Option<NaiveDate>,

    /// End date filter (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub to: Option<NaiveDate>,

    /// Output format: table (default), json
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Show per-model breakdown within each period
    #[arg(long, global = true)]
    pub breakdown: bool,

    /// Model filter (substring match when aggregating; exact model id
    /// for `estimate`, where it overrides the payload's own `model` field)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Columns to display (comma-separated).
    /// Use +col to add, -col to remove from defaults, or plain names to replace.
    /// Available: period,text_in,image_in,cached,billable,output,cost,models
    #[arg(long, global = true, value_delimiter = ',', allow_hyphen_values = true)]
    pub columns: Option<Vec<String>>,
}

pub const DEFAULT_COLUMNS: &[&str] = &[
    "period", "text_in", "image_in", "cached", "billable", "output", "cost", "models",
];

/// Resolve `--columns` into a final list.
/// - No flag → defaults
/// - All prefixed with +/- → modify defaults (e.g. `+billable,-cached`)
/// - Plain names → explicit replacement (e.g. `period,cost,models`)
pub fn resolve_columns(raw: Option<Vec<String>>) -> Vec<String> {
    let Some(raw) = raw else {
        return DEFAULT_COLUMNS.iter().map(|s| s.to_string()).collect();
    };

    let is_modifier = raw.iter().all(|c| c.starts_with('+') || c.starts_with('-'));

    if !is_modifier {
        return raw;
    }

    let mut cols: Vec<String> = DEFAULT_COLUMNS.iter().map(|s| s.to_string()).collect();
    for entry in &raw {
        if let Some(name) = entry.strip_prefix('+') {
            if !cols.iter().any(|c| c == name) {
                cols.push(name.to_string());
            }
        } else if let Some(name) = entry.strip_prefix('-') {
            cols.retain(|c| c != name);
        }
    }
    cols
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Aggregate by day (default)
    Daily,
    /// Aggregate by month
    Monthly,
    /// Aggregate by model
    Model,
    /// Estimate the cost of a single provider usage payload
    Estimate {
        /// Payload file; reads stdin when omitted
        file: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    pub fn effective_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Daily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(raw: &[&str]) -> Vec<String> {
        resolve_columns(Some(raw.iter().map(|s| s.to_string()).collect()))
    }

    #[test]
    fn no_flag_gives_defaults() {
        assert_eq!(resolve_columns(None), DEFAULT_COLUMNS);
    }

    #[test]
    fn modifiers_adjust_defaults() {
        let out = cols(&["-cached", "-models"]);
        assert!(!out.contains(&"cached".to_string()));
        assert!(!out.contains(&"models".to_string()));
        assert!(out.contains(&"billable".to_string()));
    }

    #[test]
    fn plain_names_replace() {
        assert_eq!(cols(&["period", "cost"]), vec!["period", "cost"]);
    }

    #[test]
    fn adding_existing_column_is_idempotent() {
        let out = cols(&["+cost"]);
        assert_eq!(out.iter().filter(|c| *c == "cost").count(), 1);
    }
}
