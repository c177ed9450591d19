//! Settlement engine for Potlog.
//!
//! Turns reported cash-outs into balanced nets and a minimal list of
//! settling payments, and drives the session lifecycle around it.
//!
//! # Pipeline
//!
//! 1. [`balancer`] computes `net = cash_out - buy_in` per player and folds any
//!    reporting imbalance into the nets ([`BalanceMode::MaxWinner`] or
//!    [`BalanceMode::Proportional`] via [`apportion::largest_remainder`]).
//! 2. [`minimizer`] nets recorded direct transfers pairwise and settles the
//!    adjusted balances with a greedy two-pointer sweep.
//! 3. [`SettlementCoordinator`] persists the result, reopens settled
//!    sessions, and records manual debt payments as transfers so they
//!    survive a re-settlement.
//!
//! [`SessionService`] covers the ACTIVE phase: creating sessions under a
//! unique 6-digit code, seating players, rebuys, and transfers.
//!
//! Balancing and minimization are pure functions; every persisted change is
//! one conditional [`SessionUpdate`](potlog_store::SessionUpdate).

pub mod apportion;
pub mod balancer;
pub mod coordinator;
pub mod error;
pub mod minimizer;
pub mod service;
pub mod stats;

pub use apportion::largest_remainder;
pub use balancer::{balance, balance_lenient, imbalance};
pub use coordinator::{calculate_diff, preview_settlement, Preview, SettlementCoordinator};
pub use error::{ErrorKind, SettleError, SettleResult};
pub use minimizer::{minimize, TransferMatrix};
pub use service::{ServiceConfig, SessionService, DEFAULT_ID_ALLOCATION_ATTEMPTS};
pub use stats::{SessionSummary, UserStats};

// Re-export the model so embedders need only this crate.
pub use potlog_types::{
    Amount, BalanceMode, CashOuts, Debt, DebtId, DirectTransfer, NumericCode, Player, PlayerId,
    Session, SessionStatus, TransferId,
};
