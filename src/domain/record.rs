//! Storage encoding of the ledger.
//!
//! The ledger is persisted as one JSON record under a single key so that the
//! balance and the three sets are always written together. Older installs
//! kept each field under its own key (balance as decimal text, sets as JSON
//! string arrays); those keys are still understood when loading.

use super::ledger::{Collection, LedgerState, Points};
use crate::error::Result;
use std::collections::BTreeSet;

/// Key of the composite ledger record.
pub const LEDGER_RECORD_KEY: &str = "ledger";

/// Legacy per-field keys.
pub const BALANCE_KEY: &str = "points";
pub const REDEEMED_ACHIEVEMENTS_KEY: &str = "redeemedAchievements";
pub const REDEEMED_CARDS_KEY: &str = "redeemedCards";
pub const PURCHASED_ITEMS_KEY: &str = "purchasedItems";

pub fn legacy_key(collection: Collection) -> &'static str {
    match collection {
        Collection::Achievements => REDEEMED_ACHIEVEMENTS_KEY,
        Collection::Cards => REDEEMED_CARDS_KEY,
        Collection::Items => PURCHASED_ITEMS_KEY,
    }
}

pub fn encode_record(state: &LedgerState) -> Result<String> {
    Ok(serde_json::to_string(state)?)
}

pub fn decode_record(raw: &str) -> Result<LedgerState> {
    Ok(serde_json::from_str(raw)?)
}

/// Parses a legacy balance value. Anything that is not a non-negative
/// decimal integer is treated as absent.
pub fn decode_balance(raw: &str) -> Option<Points> {
    raw.trim().parse::<u64>().ok().map(Points::new)
}

/// Parses a legacy set value. Duplicates collapse; malformed input is absent.
pub fn decode_set(raw: &str) -> Option<BTreeSet<String>> {
    serde_json::from_str::<Vec<String>>(raw)
        .ok()
        .map(|ids| ids.into_iter().collect())
}
