use chrono::NaiveDate;
use colored::{control, Colorize};

use usage_ledger::core::formatter::{format_calls, format_metadata, format_usd};
use usage_ledger::core::models::entry::UsageEntry;
use usage_ledger::core::models::ledger::DailyLedger;
use usage_ledger::core::models::summary::{DayTotal, ServiceSummary};

const RECENT_DAYS: usize = 10;

/// Render a freshly recorded entry.
///
/// ```text
///  Recorded OpenAI / completion
///   Cost      $0.0300
///   Time      2025-03-01 09:30:00
///   Metadata  model=gpt-4
/// ```
pub fn render_entry(entry: &UsageEntry, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    let header = format!(" Recorded {} / {}", entry.service, entry.operation);
    lines.push(header.bold().to_string());
    lines.push(format!("  {}      {}", "Cost".cyan(), format_usd(entry.cost_usd)));
    lines.push(format!(
        "  {}      {}",
        "Time".cyan(),
        entry.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    if !entry.metadata.is_empty() {
        lines.push(format!(
            "  {}  {}",
            "Metadata".cyan(),
            format_metadata(&entry.metadata)
        ));
    }
    lines.join("\n")
}

/// Render one day's ledger, one line per entry in recorded order.
pub fn render_daily(date: NaiveDate, ledger: &DailyLedger, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    let header = format!(
        " Usage for {} ({})",
        date.format("%Y-%m-%d"),
        format_calls(ledger.entries.len() as u64)
    );
    lines.push(header.bold().to_string());

    if ledger.is_empty() {
        lines.push(format!("  {}", "No usage recorded.".dimmed()));
        return lines.join("\n");
    }

    for entry in &ledger.entries {
        let mut line = format!(
            "  {}  {:<22} {:<18} {:>9}",
            entry.timestamp.format("%H:%M:%S").to_string().dimmed(),
            entry.service,
            entry.operation,
            format_usd(entry.cost_usd)
        );
        if !entry.metadata.is_empty() {
            line.push_str(&format!("  {}", format_metadata(&entry.metadata).dimmed()));
        }
        lines.push(line);
    }
    lines.push(format!(
        "  {}     {}",
        "Total".cyan(),
        format_usd(ledger.daily_total).green()
    ));
    lines.join("\n")
}

/// Render the per-service breakdown for a window of `days`.
///
/// ```text
///  Usage by service (7d)
///   OpenAI                 $0.75  (2 calls)
///     completion           $0.50  (1 call)
///     embedding            $0.25  (1 call)
///   Total                  $0.75  (2 calls)
///   Recent Days:
///     Mar 10       $0.50
/// ```
pub fn render_services(
    summary: &ServiceSummary,
    recent: &[DayTotal],
    days: u32,
    use_color: bool,
) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(" Usage by service ({}d)", days).bold().to_string());

    if summary.is_empty() {
        lines.push(format!("  {}", "No usage recorded.".dimmed()));
        return lines.join("\n");
    }

    for (service, totals) in &summary.services {
        lines.push(format!(
            "  {:<22} {:>9}  ({})",
            service.cyan(),
            format_usd(totals.total_cost),
            format_calls(totals.total_calls)
        ));
        for (operation, op) in &totals.operations {
            lines.push(format!(
                "    {:<20} {:>9}  ({})",
                operation,
                format_usd(op.cost),
                format_calls(op.count)
            ));
        }
    }

    lines.push(format!(
        "  {:<22} {:>9}  ({})",
        "Total".bold(),
        format_usd(summary.total_cost()).green(),
        format_calls(summary.total_calls())
    ));

    if !recent.is_empty() {
        lines.push(format!("  {}:", "Recent Days".cyan()));
        for day in recent.iter().take(RECENT_DAYS) {
            lines.push(format!(
                "    {:<12} {}",
                day.date.format("%b %d"),
                format_usd(day.total_cost)
            ));
        }
    }

    lines.join("\n")
}
