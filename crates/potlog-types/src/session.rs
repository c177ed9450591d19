use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::code::NumericCode;
use crate::debt::Debt;
use crate::entry::LedgerEntry;
use crate::error::TypeError;
use crate::id::{DebtId, PlayerId, SessionId, TransferId};
use crate::player::Player;
use crate::temporal::{self, Timestamp};
use crate::transfer::DirectTransfer;
use crate::Amount;

/// Reported cash-out per player.
pub type CashOuts = BTreeMap<PlayerId, Amount>;

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[default]
    Active,
    Settled,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("ACTIVE"),
            Self::Settled => f.write_str("SETTLED"),
        }
    }
}

/// Policy for distributing an imbalance between total buy-in and total
/// cash-out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceMode {
    /// The single biggest winner absorbs the whole difference.
    #[default]
    MaxWinner,
    /// Winners share the difference in proportion to their winnings.
    Proportional,
}

impl FromStr for BalanceMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "max-winner" => Ok(Self::MaxWinner),
            "proportional" => Ok(Self::Proportional),
            _ => Err(TypeError::InvalidBalanceMode(s.to_string())),
        }
    }
}

impl fmt::Display for BalanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxWinner => f.write_str("MAX_WINNER"),
            Self::Proportional => f.write_str("PROPORTIONAL"),
        }
    }
}

/// One shared-pot cash game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: SessionId,
    pub numeric_id: NumericCode,
    #[serde(default)]
    pub status: SessionStatus,
    pub stakes: String,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default, rename = "logs")]
    pub entries: Vec<LedgerEntry>,
    #[serde(default)]
    pub transfers: Vec<DirectTransfer>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: Timestamp,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub settled_at: Option<Timestamp>,
    /// Bumped by the store on every successful update.
    #[serde(default)]
    pub revision: u64,
}

impl Session {
    /// A new ACTIVE session with no players.
    pub fn new(numeric_id: NumericCode, stakes: impl Into<String>) -> Self {
        Self {
            id: SessionId::generate(),
            numeric_id,
            status: SessionStatus::Active,
            stakes: stakes.into(),
            players: Vec::new(),
            entries: Vec::new(),
            transfers: Vec::new(),
            debts: Vec::new(),
            created_at: temporal::now(),
            settled_at: None,
            revision: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn transfer(&self, id: &TransferId) -> Option<&DirectTransfer> {
        self.transfers.iter().find(|t| &t.id == id)
    }

    pub fn debt(&self, id: &DebtId) -> Option<&Debt> {
        self.debts.iter().find(|d| &d.id == id)
    }

    /// Sum of all buy-ins, or `None` if it does not fit in an [`Amount`].
    pub fn total_buy_in(&self) -> Option<Amount> {
        self.players
            .iter()
            .try_fold(0 as Amount, |total, p| total.checked_add(p.buy_in))
    }
}
