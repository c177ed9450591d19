//! Session ledger for Potlog.
//!
//! The ledger is the record of money entering the pot (buy-ins and rebuys)
//! and of money moving between players outside it (direct transfers). It
//! provides:
//! - [`Ledger`], a validating writer that turns an operation on a session
//!   snapshot into a conditional [`SessionUpdate`](potlog_store::SessionUpdate)
//! - [`settlement_payment`], the transfer recorded for a manual debt payment
//! - [`SessionValidator`], an auditor for stored session documents

pub mod error;
pub mod ledger;
pub mod validation;

pub use error::{LedgerError, LedgerResult};
pub use ledger::{settlement_payment, Ledger, DEFAULT_MAX_PLAYERS, SETTLEMENT_PAYMENT_NOTE};
pub use validation::{SessionValidator, ValidationReport, Violation, ViolationKind};
