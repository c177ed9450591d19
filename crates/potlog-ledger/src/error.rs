use potlog_types::{Amount, PlayerId, SessionStatus, TransferId};

/// Errors produced by ledger operations.
///
/// Every error is raised before any update is produced, so a rejected
/// operation never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("session is {0}; players and transfers can only change while ACTIVE")]
    SessionNotActive(SessionStatus),

    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("transfer not found: {0}")]
    TransferNotFound(TransferId),

    #[error("cannot transfer to self")]
    SelfTransfer,

    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Amount),

    #[error("buy-in must not be negative, got {0}")]
    NegativeBuyIn(Amount),

    #[error("player name must not be empty")]
    EmptyName,

    #[error("amount overflow")]
    AmountOverflow,

    #[error("session already has the maximum of {0} players")]
    PlayerLimitReached(usize),
}

impl LedgerError {
    /// Whether the error names something that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PlayerNotFound(_) | Self::TransferNotFound(_))
    }

    /// Whether the error is a lifecycle conflict rather than bad input.
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, Self::SessionNotActive(_))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
