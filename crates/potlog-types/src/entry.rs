use serde::{Deserialize, Serialize};

use crate::id::{EntryId, PlayerId};
use crate::temporal::{self, Timestamp};
use crate::Amount;

/// Kind of a ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    BuyIn,
    Rebuy,
    ManualTransfer,
    CashOut,
}

impl EntryKind {
    /// Whether entries of this kind add to a player's buy-in.
    pub fn counts_toward_buy_in(&self) -> bool {
        matches!(self, Self::BuyIn | Self::Rebuy)
    }
}

/// Append-only record of money entering the pot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: EntryId,
    pub player_id: PlayerId,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub amount: Amount,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LedgerEntry {
    pub fn new(player_id: PlayerId, kind: EntryKind, amount: Amount) -> Self {
        Self {
            id: EntryId::generate(),
            player_id,
            kind,
            amount,
            timestamp: temporal::now(),
            note: None,
        }
    }
}
