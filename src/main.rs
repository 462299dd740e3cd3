mod aggregate;
mod cli;
mod config;
mod cost;
mod dedup;
mod history;
mod output;
mod pricing;
mod types;
mod usage;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use cli::Cli;
use pricing::ModelId;

fn history_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(ref dir) = cli.dir {
        return Ok(dir.clone());
    }
    let config = config::load_config();
    if let Some(dir) = config.history_dir {
        return Ok(dir);
    }
    config::default_history_dir().context("Cannot determine a history directory; pass --dir")
}

fn run_estimate(file: Option<&PathBuf>, model_flag: Option<&str>) -> Result<()> {
    let data = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    // The payload may be a bare usage object or a full API response with a
    // `usage` field; accept both.
    let value: serde_json::Value = serde_json::from_str(&data).context("Payload is not JSON")?;
    let usage = value.get("usage").unwrap_or(&value);

    // --model wins over the payload's own model field; ModelId::parse
    // falls back to the default for anything unrecognized.
    let model = model_flag
        .or_else(|| value.get("model").and_then(|m| m.as_str()))
        .map(ModelId::parse)
        .unwrap_or(ModelId::DEFAULT);

    match cost::estimate_value(Some(usage), model) {
        Ok(breakdown) => {
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
            Ok(())
        }
        Err(e) => bail!("{e}"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mode = cli.effective_command();

    if let cli::Command::Estimate { ref file } = mode {
        return run_estimate(file.as_ref(), cli.model.as_deref());
    }

    let dir = history_dir(&cli)?;
    let files = history::discover_files(&dir);
    let all_records = history::load_records(&files);

    let records = dedup::dedup(all_records);

    let records: Vec<_> = match (cli.from, cli.to) {
        (None, None) => records,
        (from, to) => records
            .into_iter()
            .filter(|r| {
                let date = r.timestamp.date_naive();
                from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
            })
            .collect(),
    };

    let records: Vec<_> = if let Some(ref model) = cli.model {
        let needle = model.to_lowercase();
        records
            .into_iter()
            .filter(|r| r.model.to_lowercase().contains(&needle))
            .collect()
    } else {
        records
    };

    if records.is_empty() {
        eprintln!("No usage records found under {}.", dir.display());
        return Ok(());
    }

    eprintln!("Found {} usage records.", records.len());

    let buckets = aggregate::aggregate(&records, &mode);

    let columns = cli::resolve_columns(cli.columns);

    match cli.format {
        cli::OutputFormat::Json => output::print_json(&buckets),
        cli::OutputFormat::Table => output::print_table(&buckets, &columns, cli.breakdown),
    }

    Ok(())
}
