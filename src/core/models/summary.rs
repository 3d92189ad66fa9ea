use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::models::entry::UsageEntry;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationTotals {
    pub count: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceTotals {
    pub total_cost: f64,
    pub total_calls: u64,
    pub operations: BTreeMap<String, OperationTotals>,
}

/// Per-service aggregation over a window of days, keyed by service name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceSummary {
    pub services: BTreeMap<String, ServiceTotals>,
}

impl ServiceSummary {
    pub fn add(&mut self, entry: &UsageEntry) {
        let service = self.services.entry(entry.service.clone()).or_default();
        service.total_cost += entry.cost_usd;
        service.total_calls += 1;

        let op = service
            .operations
            .entry(entry.operation.clone())
            .or_default();
        op.count += 1;
        op.cost += entry.cost_usd;
    }

    pub fn get(&self, service: &str) -> Option<&ServiceTotals> {
        self.services.get(service)
    }

    pub fn total_cost(&self) -> f64 {
        self.services.values().map(|s| s.total_cost).fold(0.0, |a, b| a + b)
    }

    pub fn total_calls(&self) -> u64 {
        self.services.values().map(|s| s.total_calls).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Spend for one day that had at least one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub total_cost: f64,
    pub calls: u64,
}
