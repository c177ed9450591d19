//! Foundation types for Potlog.
//!
//! This crate provides the identifiers, amounts, and session data model
//! shared by every other Potlog crate.
//!
//! # Key Types
//!
//! - [`Session`] -- one shared-pot cash game, ACTIVE or SETTLED
//! - [`Player`] -- a seat at the table with cumulative buy-in and settled net
//! - [`LedgerEntry`] -- append-only buy-in / rebuy record
//! - [`DirectTransfer`] -- money that changed hands outside the pot
//! - [`Debt`] -- a settling payment produced by a settlement run
//! - [`NumericCode`] -- the human-facing 6-digit session code
//!
//! All amounts are integer minor-currency units ([`Amount`]) so sums are exact.

pub mod code;
pub mod debt;
pub mod entry;
pub mod error;
pub mod id;
pub mod player;
pub mod session;
pub mod temporal;
pub mod transfer;

pub use code::NumericCode;
pub use debt::Debt;
pub use entry::{EntryKind, LedgerEntry};
pub use error::TypeError;
pub use id::{DebtId, EntryId, PlayerId, SessionId, TransferId};
pub use player::Player;
pub use session::{BalanceMode, CashOuts, Session, SessionStatus};
pub use temporal::Timestamp;
pub use transfer::DirectTransfer;

/// Integer amount in minor currency units (e.g. cents).
pub type Amount = i64;
