use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid session code {0:?}: expected 6 digits without a leading zero")]
    InvalidNumericCode(String),

    #[error("invalid balance mode: {0}")]
    InvalidBalanceMode(String),
}
