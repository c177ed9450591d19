//! Field-level operations applied atomically to a stored session.

use potlog_types::{
    Amount, Debt, DebtId, DirectTransfer, LedgerEntry, Player, PlayerId, Session, SessionStatus,
    Timestamp, TransferId,
};

use crate::error::{StoreError, StoreResult};

/// One operation on a session document.
///
/// Scalar fields use point-set semantics; list fields use push / pull /
/// replace-whole-list semantics. Positional operations fail with
/// [`StoreError::ElementNotFound`] when their target element is absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldUpdate {
    SetStatus(SessionStatus),
    SetSettledAt(Option<Timestamp>),
    SetPlayers(Vec<Player>),
    /// Zero every player's cash-out and net in place.
    ResetPlayerResults,
    SetDebts(Vec<Debt>),
    PushPlayer(Player),
    PushEntry(LedgerEntry),
    PushTransfer(DirectTransfer),
    PullTransfer(TransferId),
    /// Add to one player's buy-in.
    IncrementBuyIn { player_id: PlayerId, amount: Amount },
    /// Compare-and-set of a debt's payment progress: applies only if the
    /// stored `settled_amount` still equals `expected_settled_amount`.
    SetDebtProgress {
        debt_id: DebtId,
        expected_settled_amount: Amount,
        settled_amount: Amount,
        settled: bool,
    },
}

/// A conditional, all-or-nothing set of [`FieldUpdate`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    /// Apply only if the stored session has this status.
    pub expect_status: Option<SessionStatus>,
    /// Apply only if the stored session is still at this revision.
    pub expect_revision: Option<u64>,
    pub ops: Vec<FieldUpdate>,
}

impl SessionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Condition the update on the stored status.
    pub fn when_status(mut self, status: SessionStatus) -> Self {
        self.expect_status = Some(status);
        self
    }

    /// Condition the update on the stored document being unchanged since
    /// it was read at `revision`.
    pub fn when_revision(mut self, revision: u64) -> Self {
        self.expect_revision = Some(revision);
        self
    }

    pub fn with(mut self, op: FieldUpdate) -> Self {
        self.ops.push(op);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply to a session in place.
    ///
    /// On error the session may be partially modified; backends apply to a
    /// copy and only publish it on success.
    pub fn apply(&self, session: &mut Session) -> StoreResult<()> {
        if let Some(expected) = self.expect_status {
            if session.status != expected {
                return Err(StoreError::StatusMismatch {
                    expected,
                    actual: session.status,
                });
            }
        }

        if let Some(expected) = self.expect_revision {
            if session.revision != expected {
                return Err(StoreError::RevisionMismatch {
                    expected,
                    actual: session.revision,
                });
            }
        }

        for op in &self.ops {
            apply_one(op, session)?;
        }
        session.revision = session.revision.wrapping_add(1);
        Ok(())
    }

    /// Apply to a copy and return it, leaving `session` untouched.
    pub fn applied_to(&self, session: &Session) -> StoreResult<Session> {
        let mut next = session.clone();
        self.apply(&mut next)?;
        Ok(next)
    }
}

fn apply_one(op: &FieldUpdate, session: &mut Session) -> StoreResult<()> {
    match op {
        FieldUpdate::SetStatus(status) => session.status = *status,
        FieldUpdate::SetSettledAt(at) => session.settled_at = *at,
        FieldUpdate::SetPlayers(players) => session.players = players.clone(),
        FieldUpdate::ResetPlayerResults => {
            for player in &mut session.players {
                player.reset_settlement();
            }
        }
        FieldUpdate::SetDebts(debts) => session.debts = debts.clone(),
        FieldUpdate::PushPlayer(player) => session.players.push(player.clone()),
        FieldUpdate::PushEntry(entry) => session.entries.push(entry.clone()),
        FieldUpdate::PushTransfer(transfer) => session.transfers.push(transfer.clone()),
        FieldUpdate::PullTransfer(id) => {
            let before = session.transfers.len();
            session.transfers.retain(|t| &t.id != id);
            if session.transfers.len() == before {
                return Err(StoreError::ElementNotFound {
                    kind: "transfer",
                    id: id.to_string(),
                });
            }
        }
        FieldUpdate::IncrementBuyIn { player_id, amount } => {
            let player = session
                .players
                .iter_mut()
                .find(|p| &p.id == player_id)
                .ok_or_else(|| StoreError::ElementNotFound {
                    kind: "player",
                    id: player_id.to_string(),
                })?;
            player.buy_in = player.buy_in.checked_add(*amount).ok_or_else(|| {
                StoreError::PreconditionFailed(format!("buy-in overflow for player {player_id}"))
            })?;
        }
        FieldUpdate::SetDebtProgress {
            debt_id,
            expected_settled_amount,
            settled_amount,
            settled,
        } => {
            let debt = session
                .debts
                .iter_mut()
                .find(|d| &d.id == debt_id)
                .ok_or_else(|| StoreError::ElementNotFound {
                    kind: "debt",
                    id: debt_id.to_string(),
                })?;
            if debt.settled_amount != *expected_settled_amount {
                return Err(StoreError::PreconditionFailed(format!(
                    "debt {debt_id} settled amount is {}, expected {expected_settled_amount}",
                    debt.settled_amount
                )));
            }
            debt.settled_amount = *settled_amount;
            debt.settled = *settled;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use potlog_types::NumericCode;

    fn session() -> Session {
        let mut s = Session::new(NumericCode::new(111_111).unwrap(), "1/2");
        s.players.push(Player::with_id("a", "Alice", 100));
        s.debts.push(Debt {
            id: "d1".into(),
            from_player_id: "b".into(),
            to_player_id: "a".into(),
            amount: 50,
            settled: false,
            settled_amount: 0,
        });
        s
    }

    #[test]
    fn status_precondition_blocks_update() {
        let mut s = session();
        s.status = SessionStatus::Settled;
        let update = SessionUpdate::new()
            .when_status(SessionStatus::Active)
            .with(FieldUpdate::PushPlayer(Player::new("Bob", 10)));
        let err = update.applied_to(&s).unwrap_err();
        assert!(matches!(
            err,
            StoreError::StatusMismatch {
                expected: SessionStatus::Active,
                actual: SessionStatus::Settled
            }
        ));
    }

    #[test]
    fn every_update_bumps_the_revision() {
        let s = session();
        let next = SessionUpdate::new()
            .with(FieldUpdate::PushPlayer(Player::new("Bob", 10)))
            .applied_to(&s)
            .unwrap();
        assert_eq!(next.revision, s.revision + 1);
    }

    #[test]
    fn stale_revision_blocks_update() {
        let s = session();
        let moved = SessionUpdate::new()
            .with(FieldUpdate::PushPlayer(Player::new("Bob", 10)))
            .applied_to(&s)
            .unwrap();
        let err = SessionUpdate::new()
            .when_revision(s.revision)
            .with(FieldUpdate::SetPlayers(Vec::new()))
            .applied_to(&moved)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::RevisionMismatch { expected: 0, actual: 1 }
        ));

        let current = SessionUpdate::new()
            .when_revision(moved.revision)
            .with(FieldUpdate::SetPlayers(Vec::new()))
            .applied_to(&moved)
            .unwrap();
        assert!(current.players.is_empty());
    }

    #[test]
    fn reset_results_keeps_buy_ins() {
        let mut s = session();
        s.players[0].cash_out = 150;
        s.players[0].net = 50;
        let next = SessionUpdate::new()
            .with(FieldUpdate::ResetPlayerResults)
            .applied_to(&s)
            .unwrap();
        assert_eq!((next.players[0].cash_out, next.players[0].net), (0, 0));
        assert_eq!(next.players[0].buy_in, 100);
    }

    #[test]
    fn increment_buy_in_adds() {
        let s = session();
        let next = SessionUpdate::new()
            .with(FieldUpdate::IncrementBuyIn {
                player_id: "a".into(),
                amount: 25,
            })
            .applied_to(&s)
            .unwrap();
        assert_eq!(next.players[0].buy_in, 125);
        assert_eq!(s.players[0].buy_in, 100);
    }

    #[test]
    fn positional_update_on_missing_element_fails() {
        let s = session();
        let err = SessionUpdate::new()
            .with(FieldUpdate::PullTransfer("nope".into()))
            .applied_to(&s)
            .unwrap_err();
        assert!(matches!(err, StoreError::ElementNotFound { kind: "transfer", .. }));
    }

    #[test]
    fn debt_progress_is_compare_and_set() {
        let s = session();
        let ok = SessionUpdate::new()
            .with(FieldUpdate::SetDebtProgress {
                debt_id: "d1".into(),
                expected_settled_amount: 0,
                settled_amount: 50,
                settled: true,
            })
            .applied_to(&s)
            .unwrap();
        assert!(ok.debts[0].settled);

        let stale = SessionUpdate::new()
            .with(FieldUpdate::SetDebtProgress {
                debt_id: "d1".into(),
                expected_settled_amount: 20,
                settled_amount: 40,
                settled: false,
            })
            .applied_to(&s)
            .unwrap_err();
        assert!(matches!(stale, StoreError::PreconditionFailed(_)));
    }

    #[test]
    fn later_failure_discards_earlier_ops() {
        let s = session();
        let err = SessionUpdate::new()
            .with(FieldUpdate::SetStatus(SessionStatus::Settled))
            .with(FieldUpdate::PullTransfer("missing".into()))
            .applied_to(&s);
        assert!(err.is_err());
        assert_eq!(s.status, SessionStatus::Active);
    }
}
