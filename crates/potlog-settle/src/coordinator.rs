use std::sync::Arc;

use potlog_ledger::settlement_payment;
use potlog_store::{FieldUpdate, SessionStore, SessionUpdate, StoreError};
use potlog_types::{
    temporal, Amount, BalanceMode, CashOuts, Debt, DebtId, DirectTransfer, NumericCode, Session,
    SessionStatus,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::balancer::{balance, balance_lenient};
use crate::error::{SettleError, SettleResult};
use crate::minimizer::minimize;

/// Debts a settlement would produce, next to the transfers they account for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub debts: Vec<Debt>,
    pub transfers: Vec<DirectTransfer>,
}

/// Runs settlements against a session store.
///
/// Every mutation is a single conditional update. A settlement is also
/// conditioned on the revision it was computed from, so a write that lands
/// between reading the session and storing the result fails the settlement
/// with [`SettleError::ConcurrentModification`] instead of being lost.
#[derive(Clone)]
pub struct SettlementCoordinator {
    store: Arc<dyn SessionStore>,
}

impl SettlementCoordinator {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Settle an ACTIVE session with the reported cash-outs.
    ///
    /// Balances the nets, computes debts net of recorded transfers, and
    /// stores status, players, debts and settlement time in one update,
    /// provided the session is unchanged since it was read.
    pub fn settle(
        &self,
        code: NumericCode,
        cash_outs: &CashOuts,
        mode: BalanceMode,
    ) -> SettleResult<Session> {
        let session = self.load(code)?;
        if session.status != SessionStatus::Active {
            return Err(SettleError::AlreadySettled);
        }

        let players = balance(&session.players, cash_outs, mode)?;
        let debts = minimize(&players, &session.transfers)?;
        let debt_count = debts.len();

        let update = SessionUpdate::new()
            .when_status(SessionStatus::Active)
            .when_revision(session.revision)
            .with(FieldUpdate::SetStatus(SessionStatus::Settled))
            .with(FieldUpdate::SetPlayers(players))
            .with(FieldUpdate::SetDebts(debts))
            .with(FieldUpdate::SetSettledAt(Some(temporal::now())));
        let settled = self
            .store
            .update_fields(code, &update)
            .map_err(|e| on_status_mismatch(e, code, SettleError::AlreadySettled))?;

        info!(%code, %mode, debts = debt_count, "session settled");
        Ok(settled)
    }

    /// Undo a settlement: back to ACTIVE with cash-outs, nets and debts
    /// cleared. Transfers and buy-in history are kept.
    pub fn reopen_session(&self, code: NumericCode) -> SettleResult<Session> {
        let session = self.load(code)?;
        if session.status != SessionStatus::Settled {
            return Err(SettleError::NotSettled);
        }

        let update = SessionUpdate::new()
            .when_status(SessionStatus::Settled)
            .with(FieldUpdate::SetStatus(SessionStatus::Active))
            .with(FieldUpdate::ResetPlayerResults)
            .with(FieldUpdate::SetDebts(Vec::new()))
            .with(FieldUpdate::SetSettledAt(None));
        let reopened = self
            .store
            .update_fields(code, &update)
            .map_err(|e| on_status_mismatch(e, code, SettleError::NotSettled))?;

        info!(%code, transfers = reopened.transfers.len(), "session reopened");
        Ok(reopened)
    }

    /// Record a manual payment against a debt.
    ///
    /// The payment is capped at what is still outstanding; a non-positive
    /// result leaves the session unchanged. The payment is also recorded as a
    /// direct transfer, so a later re-settlement nets it out.
    pub fn mark_debt_settled(
        &self,
        code: NumericCode,
        debt_id: &DebtId,
        settled_amount: Amount,
    ) -> SettleResult<Session> {
        let session = self.load(code)?;
        let debt = session
            .debt(debt_id)
            .ok_or_else(|| SettleError::DebtNotFound(debt_id.clone()))?;

        let actual = settled_amount.min(debt.outstanding());
        if actual <= 0 {
            debug!(%code, debt = %debt_id, requested = settled_amount, "nothing to settle");
            return Ok(session);
        }

        let progress = debt.settled_amount + actual;
        let update = SessionUpdate::new()
            .when_status(SessionStatus::Settled)
            .with(FieldUpdate::SetDebtProgress {
                debt_id: debt_id.clone(),
                expected_settled_amount: debt.settled_amount,
                settled_amount: progress,
                settled: progress >= debt.amount,
            })
            .with(FieldUpdate::PushTransfer(settlement_payment(debt, actual)));
        let updated = self
            .store
            .update_fields(code, &update)
            .map_err(|e| match e {
                StoreError::ElementNotFound { .. } => SettleError::DebtNotFound(debt_id.clone()),
                other => on_status_mismatch(other, code, SettleError::NotSettled),
            })?;

        info!(
            %code,
            from = %debt.from_player_id,
            to = %debt.to_player_id,
            amount = actual,
            "debt payment recorded"
        );
        Ok(updated)
    }

    /// [`preview_settlement`] for a stored session.
    pub fn preview(
        &self,
        code: NumericCode,
        cash_outs: &CashOuts,
        mode: BalanceMode,
    ) -> SettleResult<Preview> {
        preview_settlement(&self.load(code)?, cash_outs, mode)
    }

    /// [`calculate_diff`] for a stored session.
    pub fn diff(&self, code: NumericCode, cash_outs: &CashOuts) -> SettleResult<Amount> {
        calculate_diff(&self.load(code)?, cash_outs)
    }

    fn load(&self, code: NumericCode) -> SettleResult<Session> {
        self.store
            .find_by_numeric_id(code)?
            .ok_or(SettleError::SessionNotFound(code))
    }
}

/// What settling would produce, without touching the session.
///
/// Missing cash-outs count as zero.
pub fn preview_settlement(
    session: &Session,
    cash_outs: &CashOuts,
    mode: BalanceMode,
) -> SettleResult<Preview> {
    let players = balance_lenient(&session.players, cash_outs, mode)?;
    let debts = minimize(&players, &session.transfers)?;
    Ok(Preview {
        debts,
        transfers: session.transfers.clone(),
    })
}

/// `Σ buy_in - Σ cash_outs`, for live feedback while cash-outs are entered.
pub fn calculate_diff(session: &Session, cash_outs: &CashOuts) -> SettleResult<Amount> {
    let buy_in: i128 = session.players.iter().map(|p| i128::from(p.buy_in)).sum();
    let cash_out: i128 = cash_outs.values().map(|v| i128::from(*v)).sum();
    Amount::try_from(buy_in - cash_out)
        .map_err(|_| SettleError::InvalidArgument("total amounts out of range".into()))
}

fn on_status_mismatch(err: StoreError, code: NumericCode, conflict: SettleError) -> SettleError {
    match err {
        StoreError::StatusMismatch { .. } => conflict,
        StoreError::RevisionMismatch { .. } => SettleError::ConcurrentModification(code),
        StoreError::NotFound(_) => SettleError::SessionNotFound(code),
        other => SettleError::Store(other),
    }
}
