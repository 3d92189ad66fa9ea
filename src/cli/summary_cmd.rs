use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use usage_ledger::core::ledger::UsageLedger;
use usage_ledger::core::models::summary::{DayTotal, ServiceSummary};

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;

#[derive(Serialize)]
struct ServicesPayload<'a> {
    days: u32,
    total_cost: f64,
    total_calls: u64,
    services: &'a ServiceSummary,
    daily: &'a [DayTotal],
}

/// `uledger day [DATE]`
pub fn day(ledger: &UsageLedger, date: Option<NaiveDate>, opts: &OutputOptions) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let daily = ledger
        .daily_summary(Some(date))
        .with_context(|| format!("Failed to load usage for {}", date))?;

    match opts.format {
        OutputFormat::Text => println!("{}", renderer::render_daily(date, &daily, opts.use_color)),
        OutputFormat::Json => println!("{}", opts.to_json(&daily)?),
    }
    Ok(())
}

/// `uledger services [--days N]`
pub fn services(ledger: &UsageLedger, days: u32, opts: &OutputOptions) -> Result<()> {
    let today = Local::now().date_naive();
    let summary = ledger
        .service_summary_ending(days, today)
        .with_context(|| format!("Failed to summarize the last {} days", days))?;
    let daily = ledger
        .daily_totals_ending(days, today)
        .with_context(|| format!("Failed to summarize the last {} days", days))?;

    match opts.format {
        OutputFormat::Text => println!(
            "{}",
            renderer::render_services(&summary, &daily, days, opts.use_color)
        ),
        OutputFormat::Json => {
            let payload = ServicesPayload {
                days,
                total_cost: summary.total_cost(),
                total_calls: summary.total_calls(),
                services: &summary,
                daily: &daily,
            };
            println!("{}", opts.to_json(&payload)?);
        }
    }
    Ok(())
}
