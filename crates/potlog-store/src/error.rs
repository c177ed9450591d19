use potlog_types::{NumericCode, SessionStatus};

/// Errors from session store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No session is stored under the code.
    #[error("session not found: {0}")]
    NotFound(NumericCode),

    /// A session with this code already exists.
    #[error("session code already in use: {0}")]
    DuplicateCode(NumericCode),

    /// The session was not in the status the update was conditioned on.
    #[error("session status is {actual}, expected {expected}")]
    StatusMismatch {
        expected: SessionStatus,
        actual: SessionStatus,
    },

    /// The session changed since the caller read it.
    #[error("session changed concurrently: revision is {actual}, expected {expected}")]
    RevisionMismatch { expected: u64, actual: u64 },

    /// A conditional field update found a different current value.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// A positional update addressed a list element that does not exist.
    #[error("{kind} not found: {id}")]
    ElementNotFound { kind: &'static str, id: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
