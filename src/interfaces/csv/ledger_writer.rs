use crate::domain::ledger::{Collection, LedgerState};
use crate::error::Result;
use std::io::Write;

/// Writes a ledger snapshot as `entry,value` CSV rows.
///
/// The first row is the balance, followed by one row per redeemed
/// achievement, redeemed card, and purchased item, each group sorted by id.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_ledger(&mut self, state: &LedgerState) -> Result<()> {
        self.writer.write_record(["entry", "value"])?;
        self.writer
            .write_record(["balance", state.balance.to_string().as_str()])?;
        for collection in Collection::ALL {
            for id in state.entries(collection) {
                self.writer.write_record([collection.label(), id.as_str()])?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
