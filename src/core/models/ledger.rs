use serde::{Deserialize, Serialize};

use crate::core::models::entry::UsageEntry;

/// Totals that differ from the entry sum by more than this are reported.
const TOTAL_DRIFT_TOLERANCE: f64 = 1e-9;

/// One calendar day of usage, as persisted in `<YYYY-MM-DD>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyLedger {
    #[serde(default)]
    pub entries: Vec<UsageEntry>,
    #[serde(default)]
    pub daily_total: f64,
}

impl DailyLedger {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sum of `cost_usd` in entry order, starting from `0.0`.
    pub fn entry_sum(&self) -> f64 {
        self.entries.iter().fold(0.0, |acc, e| acc + e.cost_usd)
    }

    pub fn push(&mut self, entry: UsageEntry) {
        self.entries.push(entry);
        self.daily_total = self.entry_sum();
    }

    /// Re-derive `daily_total` from the entries. Returns the previous value
    /// when it disagreed with the sum.
    pub fn reconcile(&mut self) -> Option<f64> {
        let sum = self.entry_sum();
        let previous = self.daily_total;
        self.daily_total = sum;
        if (previous - sum).abs() > TOTAL_DRIFT_TOLERANCE {
            Some(previous)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::entry::Metadata;
    use chrono::Local;

    fn entry(cost: f64) -> UsageEntry {
        UsageEntry {
            timestamp: Local::now(),
            service: "OpenAI".into(),
            operation: "completion".into(),
            cost_usd: cost,
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn empty_ledger_serializes_with_both_keys() {
        let json = serde_json::to_value(DailyLedger::empty()).unwrap();
        assert_eq!(json, serde_json::json!({"entries": [], "daily_total": 0.0}));
    }

    #[test]
    fn push_keeps_total_equal_to_sum() {
        let mut ledger = DailyLedger::empty();
        ledger.push(entry(0.03));
        ledger.push(entry(0.01));
        assert_eq!(ledger.entries.len(), 2);
        assert_eq!(ledger.daily_total, 0.03 + 0.01);
        assert_eq!(ledger.daily_total, ledger.entry_sum());
    }

    #[test]
    fn reconcile_reports_drift() {
        let mut ledger = DailyLedger {
            entries: vec![entry(0.5), entry(0.25)],
            daily_total: 9.0,
        };
        assert_eq!(ledger.reconcile(), Some(9.0));
        assert_eq!(ledger.daily_total, 0.75);
        assert_eq!(ledger.reconcile(), None);
    }

    #[test]
    fn entry_sum_of_empty_is_positive_zero() {
        let ledger = DailyLedger::empty();
        assert!(ledger.entry_sum().is_sign_positive());
    }
}
