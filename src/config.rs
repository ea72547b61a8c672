//! Ledger configuration.

use crate::domain::ledger::Points;
use crate::domain::record::LEDGER_RECORD_KEY;

/// Balance granted to a user that has no stored ledger yet.
pub const DEFAULT_STARTING_BALANCE: Points = Points::new(400);

/// Settings that shape how a `PointsLedger` is loaded and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Balance used when storage holds no balance.
    pub starting_balance: Points,
    /// Storage key of the composite ledger record.
    pub record_key: String,
}

impl LedgerConfig {
    pub fn with_starting_balance(mut self, balance: Points) -> Self {
        self.starting_balance = balance;
        self
    }

    pub fn with_record_key(mut self, key: impl Into<String>) -> Self {
        self.record_key = key.into();
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            record_key: LEDGER_RECORD_KEY.to_string(),
        }
    }
}

/// Maps a `-v` count to a default tracing filter directive.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
