pub mod core;

pub use crate::core::error::{LedgerError, StorageError, ValidationError};
pub use crate::core::ledger::{LedgerOptions, UsageLedger};
pub use crate::core::models::entry::{Metadata, UsageEntry};
pub use crate::core::models::ledger::DailyLedger;
pub use crate::core::models::summary::{DayTotal, OperationTotals, ServiceSummary, ServiceTotals};
pub use crate::core::pricing::{self, Charge};
