use anyhow::{bail, Context, Result};

use usage_ledger::core::ledger::UsageLedger;
use usage_ledger::core::models::entry::{Metadata, UsageEntry};
use usage_ledger::core::pricing::Charge;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;

/// `uledger record SERVICE OPERATION [--cost X] [-m k=v]... [--metadata JSON]`
pub fn record(
    ledger: &UsageLedger,
    service: &str,
    operation: &str,
    cost: f64,
    pairs: &[String],
    metadata_json: Option<&str>,
    opts: &OutputOptions,
) -> Result<()> {
    let metadata = parse_metadata(pairs, metadata_json)?;
    let entry = ledger
        .record(service, operation, cost, metadata)
        .with_context(|| format!("Failed to record usage for {} / {}", service, operation))?;
    print_entry(&entry, opts)
}

/// `uledger log <vendor> ...`: record a priced charge from a vendor helper.
pub fn log(ledger: &UsageLedger, charge: Charge, opts: &OutputOptions) -> Result<()> {
    let label = format!("{} / {}", charge.service, charge.operation);
    let entry = ledger
        .record_charge(charge)
        .with_context(|| format!("Failed to record usage for {}", label))?;
    print_entry(&entry, opts)
}

fn print_entry(entry: &UsageEntry, opts: &OutputOptions) -> Result<()> {
    match opts.format {
        OutputFormat::Text => println!("{}", renderer::render_entry(entry, opts.use_color)),
        OutputFormat::Json => println!("{}", opts.to_json(entry)?),
    }
    Ok(())
}

/// Build metadata from an optional JSON object plus `key=value` pairs; pairs
/// override keys from the object. Values that parse as JSON keep their type,
/// anything else is stored as a string.
fn parse_metadata(pairs: &[String], metadata_json: Option<&str>) -> Result<Metadata> {
    let mut metadata = match metadata_json {
        Some(raw) => match serde_json::from_str::<serde_json::Value>(raw)
            .context("--metadata is not valid JSON")?
        {
            serde_json::Value::Object(map) => map,
            _ => bail!("--metadata must be a JSON object"),
        },
        None => Metadata::new(),
    };

    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("invalid metadata '{}': expected KEY=VALUE", pair);
        };
        if key.is_empty() {
            bail!("invalid metadata '{}': empty key", pair);
        }
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        metadata.insert(key.to_string(), value);
    }

    Ok(metadata)
}
