pub mod lock;
pub mod store;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, SubsecRound};

use crate::core::error::{LedgerError, StorageError, ValidationError};
use crate::core::models::entry::{Metadata, UsageEntry};
use crate::core::models::ledger::DailyLedger;
use crate::core::models::summary::{DayTotal, ServiceSummary};
use crate::core::pricing::Charge;

use self::lock::DayLock;

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_STALE_LOCK: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct LedgerOptions {
    pub root: PathBuf,
    pub lock_timeout: Duration,
    pub stale_lock: Duration,
}

impl LedgerOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            stale_lock: DEFAULT_STALE_LOCK,
        }
    }
}

/// Per-day usage ledger. Each calendar day is one JSON file under the root,
/// named `<YYYY-MM-DD>.json`; writes are read-append-rewrite under an
/// exclusive per-day lock.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    opts: LedgerOptions,
}

impl UsageLedger {
    pub fn new(opts: LedgerOptions) -> Self {
        Self { opts }
    }

    /// Ledger rooted at `root` with default lock settings.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(LedgerOptions::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.opts.root
    }

    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.opts
            .root
            .join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    /// Record one usage event against today's ledger.
    pub fn record(
        &self,
        service: &str,
        operation: &str,
        cost: f64,
        metadata: Metadata,
    ) -> Result<UsageEntry, LedgerError> {
        self.record_at(Local::now(), service, operation, cost, metadata)
    }

    /// Record one usage event stamped `now`, filed under `now`'s local date.
    pub fn record_at(
        &self,
        now: DateTime<Local>,
        service: &str,
        operation: &str,
        cost: f64,
        metadata: Metadata,
    ) -> Result<UsageEntry, LedgerError> {
        let cost = validate(service, operation, cost)?;

        let entry = UsageEntry {
            // Stored with microsecond precision; truncate so the returned
            // entry equals what a later read produces.
            timestamp: now.trunc_subsecs(6),
            service: service.to_string(),
            operation: operation.to_string(),
            cost_usd: cost,
            metadata,
        };

        let path = self.day_path(now.date_naive());
        std::fs::create_dir_all(&self.opts.root).map_err(|source| StorageError::CreateDir {
            path: self.opts.root.clone(),
            source,
        })?;

        let _lock = DayLock::acquire(&path, self.opts.lock_timeout, self.opts.stale_lock)?;
        let mut ledger = store::load(&path)?.unwrap_or_default();
        ledger.push(entry.clone());
        if !ledger.daily_total.is_finite() {
            return Err(ValidationError::NonFiniteTotal(ledger.daily_total).into());
        }
        store::save(&path, &ledger)?;

        tracing::debug!(
            service = %entry.service,
            operation = %entry.operation,
            cost_usd = entry.cost_usd,
            daily_total = ledger.daily_total,
            path = %path.display(),
            "recorded usage"
        );

        Ok(entry)
    }

    /// Record a charge produced by one of the pricing helpers.
    pub fn record_charge(&self, charge: Charge) -> Result<UsageEntry, LedgerError> {
        self.record(
            &charge.service,
            &charge.operation,
            charge.cost_usd,
            charge.metadata,
        )
    }

    /// The ledger for `date` (default today). A day with no file is an empty
    /// ledger, not an error. Never writes.
    pub fn daily_summary(&self, date: Option<NaiveDate>) -> Result<DailyLedger, LedgerError> {
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let path = self.day_path(date);
        match store::load(&path)? {
            Some(ledger) => Ok(ledger),
            None => {
                tracing::trace!(path = %path.display(), "no ledger for day");
                Ok(DailyLedger::empty())
            }
        }
    }

    /// Aggregate by service over the last `days` days, today included.
    pub fn service_summary(&self, days: u32) -> Result<ServiceSummary, LedgerError> {
        self.service_summary_ending(days, Local::now().date_naive())
    }

    pub fn service_summary_ending(
        &self,
        days: u32,
        today: NaiveDate,
    ) -> Result<ServiceSummary, LedgerError> {
        let mut summary = ServiceSummary::default();
        for date in window(days, today)? {
            for entry in &self.daily_summary(Some(date))?.entries {
                summary.add(entry);
            }
        }
        Ok(summary)
    }

    /// Per-day totals for days in the window that have entries, newest first.
    pub fn daily_totals(&self, days: u32) -> Result<Vec<DayTotal>, LedgerError> {
        self.daily_totals_ending(days, Local::now().date_naive())
    }

    pub fn daily_totals_ending(
        &self,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DayTotal>, LedgerError> {
        let mut totals = Vec::new();
        for date in window(days, today)? {
            let ledger = self.daily_summary(Some(date))?;
            if ledger.is_empty() {
                continue;
            }
            totals.push(DayTotal {
                date,
                total_cost: ledger.daily_total,
                calls: ledger.entries.len() as u64,
            });
        }
        Ok(totals)
    }
}

/// Dates from `today` back through `today - (days - 1)`.
fn window(days: u32, today: NaiveDate) -> Result<impl Iterator<Item = NaiveDate>, ValidationError> {
    if days == 0 {
        return Err(ValidationError::ZeroDays);
    }
    Ok((0..days as i64).map(move |i| today - chrono::Duration::days(i)))
}

fn validate(service: &str, operation: &str, cost: f64) -> Result<f64, ValidationError> {
    if service.trim().is_empty() {
        return Err(ValidationError::EmptyService);
    }
    if operation.trim().is_empty() {
        return Err(ValidationError::EmptyOperation);
    }
    if !cost.is_finite() {
        return Err(ValidationError::NonFiniteCost(cost));
    }
    if cost < 0.0 {
        return Err(ValidationError::NegativeCost(cost));
    }
    // Normalizes -0.0.
    Ok(cost + 0.0)
}
