//! End-to-end session lifecycle against the in-memory store.

use std::sync::Arc;

use potlog_ledger::{SessionValidator, SETTLEMENT_PAYMENT_NOTE};
use potlog_settle::{
    preview_settlement, BalanceMode, CashOuts, ErrorKind, NumericCode, PlayerId, Session,
    SessionService, SessionStatus, SettleError, SettlementCoordinator,
};
use potlog_store::InMemorySessionStore;
use proptest::prelude::*;

fn engine() -> (SessionService, SettlementCoordinator) {
    let store = Arc::new(InMemorySessionStore::new());
    (
        SessionService::new(store.clone()),
        SettlementCoordinator::new(store),
    )
}

fn seat(svc: &SessionService, code: NumericCode, names: &[(&str, i64)]) -> Vec<PlayerId> {
    names
        .iter()
        .map(|(name, buy_in)| {
            let s = svc.add_player(code, name, *buy_in, None).unwrap();
            s.players.last().unwrap().id.clone()
        })
        .collect()
}

fn pairs(session: &Session) -> Vec<(PlayerId, PlayerId, i64)> {
    session
        .debts
        .iter()
        .map(|d| (d.from_player_id.clone(), d.to_player_id.clone(), d.amount))
        .collect()
}

#[test]
fn full_game_round_trip() {
    let (svc, coordinator) = engine();
    let code = svc.create_session("1/2 NLH").unwrap().numeric_id;
    let ids = seat(&svc, code, &[("Alice", 100_00), ("Bob", 100_00), ("Carol", 100_00)]);
    let (alice, bob, carol) = (&ids[0], &ids[1], &ids[2]);

    svc.rebuy(code, bob, 100_00).unwrap();
    svc.add_transfer(code, carol, alice, 20_00, Some("cash for chips".into()))
        .unwrap();

    // Buy-in 400, cash-out 400: no imbalance.
    let cash_outs = CashOuts::from([
        (alice.clone(), 250_00),
        (bob.clone(), 50_00),
        (carol.clone(), 100_00),
    ]);
    let settled = coordinator
        .settle(code, &cash_outs, BalanceMode::Proportional)
        .unwrap();
    assert_eq!(settled.status, SessionStatus::Settled);
    let nets: Vec<_> = settled.players.iter().map(|p| p.net).collect();
    assert_eq!(nets, vec![150_00, -150_00, 0]);
    // Carol paid Alice 20 outside the pot: Alice is owed 130, Carol 20.
    assert_eq!(
        pairs(&settled),
        vec![
            (bob.clone(), alice.clone(), 130_00),
            (bob.clone(), carol.clone(), 20_00),
        ]
    );
    assert!(SessionValidator::validate(&settled).is_valid());

    // Settled sessions are read-only for the ledger.
    let err = svc.add_player(code, "Dave", 10_00, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // Bob pays Alice in full, then the table reopens and settles again.
    let debt = settled.debts[0].id.clone();
    let paid = coordinator.mark_debt_settled(code, &debt, 130_00).unwrap();
    assert!(paid.debt(&debt).unwrap().settled);
    assert_eq!(
        paid.transfers.last().unwrap().note.as_deref(),
        Some(SETTLEMENT_PAYMENT_NOTE)
    );

    let reopened = coordinator.reopen_session(code).unwrap();
    assert_eq!(reopened.transfers.len(), 2);
    assert!(SessionValidator::validate(&reopened).is_valid());

    let resettled = coordinator
        .settle(code, &cash_outs, BalanceMode::Proportional)
        .unwrap();
    assert_eq!(pairs(&resettled), vec![(bob.clone(), carol.clone(), 20_00)]);
}

#[test]
fn over_reported_cash_outs_cancel_proportionally() {
    let (svc, coordinator) = engine();
    let code = svc.create_session("2/5").unwrap().numeric_id;
    let ids = seat(&svc, code, &[("Alice", 100_00), ("Bob", 100_00), ("Charlie", 100_00)]);
    let cash_outs = CashOuts::from([
        (ids[0].clone(), 200_00),
        (ids[1].clone(), 150_00),
        (ids[2].clone(), 130_00),
    ]);
    assert_eq!(coordinator.diff(code, &cash_outs).unwrap(), -180_00);

    let settled = coordinator
        .settle(code, &cash_outs, BalanceMode::Proportional)
        .unwrap();
    assert!(settled.players.iter().all(|p| p.net == 0));
    assert!(settled.debts.is_empty());
}

#[test]
fn one_winner_three_losers() {
    let (svc, coordinator) = engine();
    let code = svc.create_session("1/3").unwrap().numeric_id;
    let ids = seat(
        &svc,
        code,
        &[("Alice", 100_00), ("Bob", 100_00), ("Charlie", 100_00), ("Dave", 100_00)],
    );
    let cash_outs = CashOuts::from([
        (ids[0].clone(), 400_00),
        (ids[1].clone(), 0),
        (ids[2].clone(), 0),
        (ids[3].clone(), 0),
    ]);
    let settled = coordinator
        .settle(code, &cash_outs, BalanceMode::MaxWinner)
        .unwrap();
    assert_eq!(settled.debts.len(), 3);
    assert!(settled
        .debts
        .iter()
        .all(|d| d.to_player_id == ids[0] && d.amount == 100_00));
}

#[test]
fn user_stats_follow_linked_players() {
    let (svc, coordinator) = engine();
    for (winnings, stakes) in [(30_00, "1/2"), (-10_00, "2/5")] {
        let code = svc.create_session(stakes).unwrap().numeric_id;
        let me = svc
            .add_player(code, "Me", 100_00, Some("user-1".into()))
            .unwrap()
            .players[0]
            .id
            .clone();
        let other = svc.add_player(code, "Other", 100_00, None).unwrap().players[1]
            .id
            .clone();
        let cash_outs = CashOuts::from([(me, 100_00 + winnings), (other, 100_00 - winnings)]);
        coordinator
            .settle(code, &cash_outs, BalanceMode::MaxWinner)
            .unwrap();
    }

    let stats = svc.user_stats("user-1").unwrap();
    assert_eq!(stats.session_count, 2);
    assert_eq!(stats.total_net, 20_00);
}

#[test]
fn errors_map_to_taxonomy() {
    let (svc, coordinator) = engine();
    let code = svc.create_session("1/2").unwrap().numeric_id;
    let ids = seat(&svc, code, &[("Alice", 10_00)]);

    let missing = coordinator
        .settle(code, &CashOuts::new(), BalanceMode::MaxWinner)
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::InvalidArgument);

    let self_transfer = svc
        .add_transfer(code, &ids[0], &ids[0], 5_00, None)
        .unwrap_err();
    assert_eq!(self_transfer.kind(), ErrorKind::InvalidArgument);

    let unknown = NumericCode::new(999_999).unwrap();
    assert!(matches!(
        svc.get_session(unknown),
        Err(SettleError::SessionNotFound(_))
    ));
    assert_eq!(
        coordinator.reopen_session(code).unwrap_err().kind(),
        ErrorKind::InvalidState
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn paid_debts_vanish_after_reopen(
        rows in proptest::collection::vec((1i64..50_000, 0i64..100_000), 2..6),
        proportional in any::<bool>(),
    ) {
        let mode = if proportional { BalanceMode::Proportional } else { BalanceMode::MaxWinner };
        let (svc, coordinator) = engine();
        let code = svc.create_session("1/2").unwrap().numeric_id;

        let mut cash_outs = CashOuts::new();
        for (i, (buy_in, cash_out)) in rows.iter().enumerate() {
            let s = svc.add_player(code, &format!("P{i}"), *buy_in, None).unwrap();
            cash_outs.insert(s.players[i].id.clone(), *cash_out);
        }

        let settled = coordinator.settle(code, &cash_outs, mode).unwrap();
        prop_assert_eq!(settled.players.iter().map(|p| p.net).sum::<i64>(), 0);

        // Previewing the settled session reproduces the stored debts.
        let snapshot = svc.get_session(code).unwrap();
        let preview = preview_settlement(&snapshot, &cash_outs, mode).unwrap();
        let previewed: Vec<_> = preview
            .debts
            .iter()
            .map(|d| (d.from_player_id.clone(), d.to_player_id.clone(), d.amount))
            .collect();
        prop_assert_eq!(previewed, pairs(&settled));
        prop_assert_eq!(svc.get_session(code).unwrap(), snapshot);

        let Some(first) = settled.debts.first().cloned() else {
            return Ok(());
        };
        coordinator.mark_debt_settled(code, &first.id, first.amount).unwrap();
        coordinator.reopen_session(code).unwrap();

        let resettled = coordinator.settle(code, &cash_outs, mode).unwrap();
        prop_assert!(!resettled
            .debts
            .iter()
            .any(|d| d.involves_pair(&first.from_player_id, &first.to_player_id)));
    }
}
