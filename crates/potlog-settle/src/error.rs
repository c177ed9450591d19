use potlog_ledger::LedgerError;
use potlog_store::StoreError;
use potlog_types::{DebtId, NumericCode, PlayerId};
use thiserror::Error;

/// Errors from settlement and session operations.
#[derive(Debug, Error)]
pub enum SettleError {
    #[error("session not found: {0}")]
    SessionNotFound(NumericCode),

    #[error("debt not found: {0}")]
    DebtNotFound(DebtId),

    #[error("missing cash-out for player {name} ({id})")]
    MissingCashOut { id: PlayerId, name: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("session already settled")]
    AlreadySettled,

    #[error("session is not settled, cannot reopen")]
    NotSettled,

    #[error("session {0} changed during settlement, retry")]
    ConcurrentModification(NumericCode),

    #[error("failed to allocate a unique session code after {0} attempts")]
    AllocationExhausted(usize),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification callers use to decide how to surface an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InvalidState,
    AllocationExhausted,
    Invariant,
    Internal,
}

impl SettleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionNotFound(_) | Self::DebtNotFound(_) => ErrorKind::NotFound,
            Self::MissingCashOut { .. } | Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::AlreadySettled | Self::NotSettled | Self::ConcurrentModification(_) => {
                ErrorKind::InvalidState
            }
            Self::AllocationExhausted(_) => ErrorKind::AllocationExhausted,
            Self::Invariant(_) => ErrorKind::Invariant,
            Self::Ledger(e) if e.is_not_found() => ErrorKind::NotFound,
            Self::Ledger(e) if e.is_state_conflict() => ErrorKind::InvalidState,
            Self::Ledger(_) => ErrorKind::InvalidArgument,
            Self::Store(e) => match e {
                StoreError::NotFound(_) | StoreError::ElementNotFound { .. } => ErrorKind::NotFound,
                StoreError::StatusMismatch { .. }
                | StoreError::RevisionMismatch { .. }
                | StoreError::PreconditionFailed(_) => ErrorKind::InvalidState,
                _ => ErrorKind::Internal,
            },
        }
    }
}

pub type SettleResult<T> = Result<T, SettleError>;
