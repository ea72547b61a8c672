//! Domain layer: ledger state, its storage encoding, and the storage port.

pub mod command;
pub mod ledger;
pub mod ports;
pub mod record;
