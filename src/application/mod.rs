//! Application layer owning the ledger and its persistence.
//!
//! `PointsLedger` is the single owner of a user's ledger state. It is
//! constructed over an injected `KeyValueStore` and handed to whatever needs
//! to read or change the balance.

pub mod ledger;
