//! Net results and imbalance distribution.
//!
//! A player's raw net is `cash_out - buy_in`. When the reported cash-outs do
//! not add up to the total buy-in, the difference
//! `diff = Σ buy_in - Σ cash_out` is folded into the nets so they sum to
//! zero exactly, using one of two [`BalanceMode`] policies.

use potlog_types::{Amount, BalanceMode, CashOuts, Player};
use tracing::{debug, info};

use crate::apportion::largest_remainder;
use crate::error::{SettleError, SettleResult};

/// Attach cash-outs and compute balanced nets.
///
/// Every player must have a cash-out entry; a missing one fails with
/// [`SettleError::MissingCashOut`]. Returns new players; the input is not
/// modified.
pub fn balance(
    players: &[Player],
    cash_outs: &CashOuts,
    mode: BalanceMode,
) -> SettleResult<Vec<Player>> {
    let mut with_nets = Vec::with_capacity(players.len());
    for player in players {
        let cash_out = cash_outs
            .get(&player.id)
            .copied()
            .ok_or_else(|| SettleError::MissingCashOut {
                id: player.id.clone(),
                name: player.name.clone(),
            })?;
        with_nets.push(with_cash_out(player, cash_out)?);
    }
    distribute(with_nets, mode)
}

/// Like [`balance`], but a missing cash-out counts as zero.
pub fn balance_lenient(
    players: &[Player],
    cash_outs: &CashOuts,
    mode: BalanceMode,
) -> SettleResult<Vec<Player>> {
    let with_nets = players
        .iter()
        .map(|p| with_cash_out(p, cash_outs.get(&p.id).copied().unwrap_or(0)))
        .collect::<SettleResult<Vec<_>>>()?;
    distribute(with_nets, mode)
}

/// `Σ buy_in - Σ cash_out` over players that already carry their cash-outs.
pub fn imbalance(players: &[Player]) -> SettleResult<Amount> {
    let buy_in: i128 = players.iter().map(|p| i128::from(p.buy_in)).sum();
    let cash_out: i128 = players.iter().map(|p| i128::from(p.cash_out)).sum();
    Amount::try_from(buy_in - cash_out)
        .map_err(|_| SettleError::InvalidArgument("total amounts out of range".into()))
}

fn with_cash_out(player: &Player, cash_out: Amount) -> SettleResult<Player> {
    if cash_out < 0 {
        return Err(SettleError::InvalidArgument(format!(
            "cash-out for player {} must not be negative, got {cash_out}",
            player.name
        )));
    }
    let net = cash_out.checked_sub(player.buy_in).ok_or_else(|| {
        SettleError::InvalidArgument(format!("net for player {} out of range", player.name))
    })?;
    Ok(Player {
        cash_out,
        net,
        ..player.clone()
    })
}

fn distribute(mut players: Vec<Player>, mode: BalanceMode) -> SettleResult<Vec<Player>> {
    let diff = imbalance(&players)?;
    let total_buy_in: i128 = players.iter().map(|p| i128::from(p.buy_in)).sum();
    info!(diff, total_buy_in, mode = %mode, "balancing settlement");

    if diff != 0 {
        match mode {
            BalanceMode::MaxWinner => apply_to_max_winner(&mut players, diff)?,
            BalanceMode::Proportional => apply_proportionally(&mut players, diff)?,
        }
    }

    let residual: i128 = players.iter().map(|p| i128::from(p.net)).sum();
    if residual != 0 {
        return Err(SettleError::Invariant(format!(
            "balanced nets sum to {residual}, expected 0"
        )));
    }
    Ok(players)
}

/// The whole difference goes to the player with the largest net; ties go to
/// the first such player.
fn apply_to_max_winner(players: &mut [Player], diff: Amount) -> SettleResult<()> {
    let mut best: Option<usize> = None;
    for (index, player) in players.iter().enumerate() {
        if best.map_or(true, |b| player.net > players[b].net) {
            best = Some(index);
        }
    }
    let index = best.ok_or_else(|| {
        SettleError::Invariant(format!("no players to absorb a difference of {diff}"))
    })?;

    let winner = &mut players[index];
    debug!(player = %winner.id, diff, "max winner absorbs difference");
    winner.net = add_checked(winner.net, diff)?;
    Ok(())
}

/// Winners (positive net) share the difference in proportion to their
/// winnings. With no winners the max-winner policy applies to everyone.
fn apply_proportionally(players: &mut [Player], diff: Amount) -> SettleResult<()> {
    let winners: Vec<usize> = players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.net > 0)
        .map(|(index, _)| index)
        .collect();
    if winners.is_empty() {
        debug!(diff, "no winners, falling back to max winner");
        return apply_to_max_winner(players, diff);
    }

    let weights: Vec<Amount> = winners.iter().map(|i| players[*i].net).collect();
    let shares = largest_remainder(&weights, diff)?;
    for (index, share) in winners.into_iter().zip(shares) {
        let player = &mut players[index];
        player.net = add_checked(player.net, share)?;
    }
    Ok(())
}

fn add_checked(net: Amount, adjustment: Amount) -> SettleResult<Amount> {
    net.checked_add(adjustment)
        .ok_or_else(|| SettleError::InvalidArgument("adjusted net out of range".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn player(id: &str, buy_in: Amount) -> Player {
        Player::with_id(id, id.to_uppercase(), buy_in)
    }

    fn cash(entries: &[(&str, Amount)]) -> CashOuts {
        entries.iter().map(|(id, v)| ((*id).into(), *v)).collect()
    }

    fn nets(players: &[Player]) -> Vec<Amount> {
        players.iter().map(|p| p.net).collect()
    }

    #[test]
    fn balanced_house_leaves_raw_nets() {
        let players = vec![player("a", 100_00), player("b", 100_00)];
        let result = balance(
            &players,
            &cash(&[("a", 150_00), ("b", 50_00)]),
            BalanceMode::Proportional,
        )
        .unwrap();
        assert_eq!(nets(&result), vec![50_00, -50_00]);
        assert_eq!(result[0].cash_out, 150_00);
    }

    #[test]
    fn max_winner_absorbs_difference() {
        let players = vec![player("a", 100_00), player("b", 100_00)];
        let result = balance(
            &players,
            &cash(&[("a", 180_00), ("b", 50_00)]),
            BalanceMode::MaxWinner,
        )
        .unwrap();
        assert_eq!(nets(&result), vec![50_00, -50_00]);
    }

    #[test]
    fn max_winner_ties_go_to_first_player() {
        let players = vec![player("a", 100), player("b", 100), player("c", 100)];
        let result = balance(
            &players,
            &cash(&[("a", 150), ("b", 150), ("c", 10)]),
            BalanceMode::MaxWinner,
        )
        .unwrap();
        // diff = 300 - 310 = -10
        assert_eq!(nets(&result), vec![40, 50, -90]);
    }

    #[test]
    fn proportional_leaves_losers_untouched() {
        let players = vec![player("a", 100_00), player("b", 100_00), player("c", 100_00)];
        let result = balance(
            &players,
            &cash(&[("a", 160_00), ("b", 140_00), ("c", 10_00)]),
            BalanceMode::Proportional,
        )
        .unwrap();
        // diff = 300 - 310 = -10; winners 60 and 40 share -6 and -4.
        assert_eq!(nets(&result), vec![54_00, 36_00, -90_00]);
    }

    #[test]
    fn proportional_over_report_cancels_all_winnings() {
        let players = vec![player("alice", 100_00), player("bob", 100_00), player("charlie", 100_00)];
        let result = balance(
            &players,
            &cash(&[("alice", 200_00), ("bob", 150_00), ("charlie", 130_00)]),
            BalanceMode::Proportional,
        )
        .unwrap();
        assert_eq!(nets(&result), vec![0, 0, 0]);
    }

    #[test]
    fn proportional_without_winners_falls_back_to_max_winner() {
        let players = vec![player("a", 100), player("b", 100)];
        let result = balance(
            &players,
            &cash(&[("a", 90), ("b", 50)]),
            BalanceMode::Proportional,
        )
        .unwrap();
        // diff = 60, all nets negative: the biggest net (-10) absorbs it.
        assert_eq!(nets(&result), vec![50, -50]);
    }

    #[test]
    fn missing_cash_out_fails() {
        let players = vec![player("a", 100), player("b", 100)];
        let err = balance(&players, &cash(&[("a", 200)]), BalanceMode::MaxWinner).unwrap_err();
        assert!(matches!(err, SettleError::MissingCashOut { id, .. } if id.as_str() == "b"));
    }

    #[test]
    fn lenient_balance_defaults_missing_to_zero() {
        let players = vec![player("a", 100), player("b", 100)];
        let result =
            balance_lenient(&players, &cash(&[("a", 200)]), BalanceMode::MaxWinner).unwrap();
        assert_eq!(result[1].cash_out, 0);
        assert_eq!(nets(&result), vec![100, -100]);
    }

    #[test]
    fn negative_cash_out_is_rejected() {
        let players = vec![player("a", 100)];
        let err = balance(&players, &cash(&[("a", -1)]), BalanceMode::MaxWinner).unwrap_err();
        assert!(matches!(err, SettleError::InvalidArgument(_)));
    }

    #[test]
    fn large_balanced_table_does_not_overflow() {
        let big = 5_000_000_000_000_000_000;
        let players = vec![player("a", big), player("b", big)];
        let out = balance(&players, &cash(&[("a", big), ("b", big)]), BalanceMode::MaxWinner)
            .unwrap();
        assert_eq!(nets(&out), vec![0, 0]);
    }

    #[test]
    fn empty_table_balances_trivially() {
        let result = balance(&[], &CashOuts::new(), BalanceMode::Proportional).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn input_players_are_not_modified() {
        let players = vec![player("a", 100), player("b", 100)];
        let _ = balance(&players, &cash(&[("a", 150), ("b", 20)]), BalanceMode::MaxWinner).unwrap();
        assert_eq!(players[0].cash_out, 0);
        assert_eq!(players[0].net, 0);
    }

    fn table() -> impl Strategy<Value = (Vec<Player>, CashOuts)> {
        proptest::collection::vec((0i64..1_000_000, 0i64..2_000_000), 1..10).prop_map(|rows| {
            let mut players = Vec::new();
            let mut cash_outs = CashOuts::new();
            for (i, (buy_in, cash_out)) in rows.into_iter().enumerate() {
                let p = player(&format!("p{i}"), buy_in);
                cash_outs.insert(p.id.clone(), cash_out);
                players.push(p);
            }
            (players, cash_outs)
        })
    }

    proptest! {
        #[test]
        fn nets_always_sum_to_zero((players, cash_outs) in table(), proportional in any::<bool>()) {
            let mode = if proportional { BalanceMode::Proportional } else { BalanceMode::MaxWinner };
            let result = balance(&players, &cash_outs, mode).unwrap();
            prop_assert_eq!(result.iter().map(|p| p.net).sum::<Amount>(), 0);
        }

        #[test]
        fn proportional_only_moves_winners((players, cash_outs) in table()) {
            let result = balance(&players, &cash_outs, BalanceMode::Proportional).unwrap();
            let has_winner = result.iter().any(|p| p.raw_net() > 0);
            if has_winner {
                for p in result.iter().filter(|p| p.raw_net() <= 0) {
                    prop_assert_eq!(p.net, p.raw_net());
                }
            }
        }
    }
}
