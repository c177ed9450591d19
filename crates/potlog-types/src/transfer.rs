use serde::{Deserialize, Serialize};

use crate::id::{PlayerId, TransferId};
use crate::temporal::{self, Timestamp};
use crate::Amount;

/// Money that changed hands between two players outside the pot.
///
/// Transfers are immutable once recorded and are netted out of the debts a
/// settlement produces: a transfer from A to B means A is owed that much more
/// and B owes that much less.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectTransfer {
    pub id: TransferId,
    pub from_player_id: PlayerId,
    pub to_player_id: PlayerId,
    pub amount: Amount,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DirectTransfer {
    pub fn new(from: PlayerId, to: PlayerId, amount: Amount) -> Self {
        Self {
            id: TransferId::generate(),
            from_player_id: from,
            to_player_id: to,
            amount,
            timestamp: temporal::now(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_wire_format() {
        let t = DirectTransfer::new("a".into(), "b".into(), 2_500)
            .with_note(Some("cash at the table".into()));
        let value = serde_json::to_value(&t).unwrap();
        assert_eq!(value["fromPlayerId"], "a");
        assert_eq!(value["toPlayerId"], "b");
        assert_eq!(value["amount"], 2_500);
        assert_eq!(value["note"], "cash at the table");

        let back: DirectTransfer = serde_json::from_value(value).unwrap();
        assert_eq!(back, t);
    }
}
