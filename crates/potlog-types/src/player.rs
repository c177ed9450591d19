use serde::{Deserialize, Serialize};

use crate::id::PlayerId;
use crate::Amount;

/// A seat in a session.
///
/// `buy_in` only ever grows (initial buy-in plus rebuys). `cash_out` and
/// `net` stay zero while the session is ACTIVE and are written by a
/// settlement run, where `net` is the balanced cash-out minus the buy-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub buy_in: Amount,
    #[serde(default)]
    pub cash_out: Amount,
    #[serde(default)]
    pub net: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Player {
    /// A fresh player with a generated id.
    pub fn new(name: impl Into<String>, buy_in: Amount) -> Self {
        Self::with_id(PlayerId::generate(), name, buy_in)
    }

    pub fn with_id(id: impl Into<PlayerId>, name: impl Into<String>, buy_in: Amount) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            buy_in,
            cash_out: 0,
            net: 0,
            user_id: None,
        }
    }

    /// Attach an external user reference.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Raw result before any imbalance is distributed.
    pub fn raw_net(&self) -> Amount {
        self.cash_out - self.buy_in
    }

    /// Clear settlement results, keeping identity and buy-in history.
    pub fn reset_settlement(&mut self) {
        self.cash_out = 0;
        self.net = 0;
    }
}
