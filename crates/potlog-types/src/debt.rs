use serde::{Deserialize, Serialize};

use crate::id::{DebtId, PlayerId};
use crate::Amount;

/// A settling payment: `from` owes `to` the given amount.
///
/// `settled_amount` accumulates manual partial payments and always stays
/// within `0..=amount`; `settled` flips once it reaches `amount`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: DebtId,
    pub from_player_id: PlayerId,
    pub to_player_id: PlayerId,
    pub amount: Amount,
    #[serde(default)]
    pub settled: bool,
    #[serde(default)]
    pub settled_amount: Amount,
}

impl Debt {
    pub fn new(from: PlayerId, to: PlayerId, amount: Amount) -> Self {
        Self {
            id: DebtId::generate(),
            from_player_id: from,
            to_player_id: to,
            amount,
            settled: false,
            settled_amount: 0,
        }
    }

    /// Amount still owed.
    pub fn outstanding(&self) -> Amount {
        self.amount - self.settled_amount
    }

    /// Whether this debt runs between the two players, in either direction.
    pub fn involves_pair(&self, a: &PlayerId, b: &PlayerId) -> bool {
        (&self.from_player_id == a && &self.to_player_id == b)
            || (&self.from_player_id == b && &self.to_player_id == a)
    }
}
