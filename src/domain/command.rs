use super::ledger::Points;
use crate::error::LedgerError;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Add,
    Subtract,
    RedeemAchievement,
    RedeemCard,
    Purchase,
}

/// Flat shape of a command as it appears in a batch file.
#[derive(Debug, Deserialize, Clone)]
pub struct CommandRow {
    pub command: CommandKind,
    pub id: Option<String>,
    pub amount: Option<u64>,
}

/// A single request against the ledger.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(try_from = "CommandRow")]
pub enum LedgerCommand {
    AddPoints(Points),
    SubtractPoints(Points),
    RedeemAchievement { id: String, value: Points },
    RedeemCard { id: String, value: Points },
    Purchase { id: String, cost: Points },
}

impl TryFrom<CommandRow> for LedgerCommand {
    type Error = LedgerError;

    fn try_from(row: CommandRow) -> Result<Self, Self::Error> {
        let amount = row.amount.map(Points::new).ok_or_else(|| {
            LedgerError::ValidationError(format!("{:?} requires an amount", row.command))
        })?;
        let id = || match row.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(LedgerError::ValidationError(format!(
                "{:?} requires an id",
                row.command
            ))),
        };

        Ok(match row.command {
            CommandKind::Add => Self::AddPoints(amount),
            CommandKind::Subtract => Self::SubtractPoints(amount),
            CommandKind::RedeemAchievement => Self::RedeemAchievement {
                id: id()?,
                value: amount,
            },
            CommandKind::RedeemCard => Self::RedeemCard {
                id: id()?,
                value: amount,
            },
            CommandKind::Purchase => Self::Purchase {
                id: id()?,
                cost: amount,
            },
        })
    }
}
