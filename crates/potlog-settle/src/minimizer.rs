//! Debt minimization.
//!
//! Direct transfers are first consolidated into one net edge per player
//! pair, then folded into the balanced nets. The adjusted balances are
//! settled by a greedy two-pointer sweep over debtors and creditors in
//! player order, which yields at most `n - 1` debts for `n` non-zero
//! balances.

use std::collections::HashMap;

use potlog_types::{Amount, Debt, DirectTransfer, Player, PlayerId};
use tracing::debug;

use crate::error::{SettleError, SettleResult};

/// Direct transfers netted into a single directed edge per pair.
///
/// Edges keep the order in which they were first recorded. An edge whose
/// direction flips is removed and recorded again at the end.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferMatrix {
    edges: Vec<(PlayerId, PlayerId, Amount)>,
}

impl TransferMatrix {
    /// Consolidate transfers in order, netting each against any reverse edge.
    pub fn consolidate(transfers: &[DirectTransfer]) -> SettleResult<Self> {
        let mut matrix = Self::default();
        for transfer in transfers {
            matrix.record(
                &transfer.from_player_id,
                &transfer.to_player_id,
                transfer.amount,
            )?;
        }
        Ok(matrix)
    }

    fn record(&mut self, from: &PlayerId, to: &PlayerId, amount: Amount) -> SettleResult<()> {
        if let Some(i) = self.position(to, from) {
            let existing = self.edges[i].2;
            if amount < existing {
                self.edges[i].2 = existing - amount;
            } else {
                self.edges.remove(i);
                if amount > existing {
                    self.edges.push((from.clone(), to.clone(), amount - existing));
                }
            }
            return Ok(());
        }
        match self.position(from, to) {
            Some(i) => {
                let edge = &mut self.edges[i].2;
                *edge = edge.checked_add(amount).ok_or_else(|| {
                    SettleError::InvalidArgument("transfer total out of range".into())
                })?;
            }
            None => self.edges.push((from.clone(), to.clone(), amount)),
        }
        Ok(())
    }

    fn position(&self, from: &PlayerId, to: &PlayerId) -> Option<usize> {
        self.edges
            .iter()
            .position(|(f, t, _)| f == from && t == to)
    }

    /// Net amount `from` has paid `to`, if any.
    pub fn get(&self, from: &PlayerId, to: &PlayerId) -> Option<Amount> {
        self.position(from, to).map(|i| self.edges[i].2)
    }

    /// Edges in recording order.
    pub fn edges(&self) -> impl Iterator<Item = (&PlayerId, &PlayerId, Amount)> {
        self.edges.iter().map(|(from, to, v)| (from, to, *v))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Balances after applying consolidated transfers, in player order.
///
/// A transfer A→B of `v` means A already paid B outside the pot, so A's
/// balance rises by `v` and B's falls by `v`. Players that appear only in
/// transfers are appended after the seated players.
pub fn adjusted_balances(players: &[Player], matrix: &TransferMatrix) -> Vec<(PlayerId, i128)> {
    let mut balances: Vec<(PlayerId, i128)> = players
        .iter()
        .map(|p| (p.id.clone(), i128::from(p.net)))
        .collect();
    let mut index: HashMap<PlayerId, usize> = balances
        .iter()
        .enumerate()
        .map(|(i, (id, _))| (id.clone(), i))
        .collect();

    let mut slot = |id: &PlayerId, balances: &mut Vec<(PlayerId, i128)>| -> usize {
        *index.entry(id.clone()).or_insert_with(|| {
            balances.push((id.clone(), 0));
            balances.len() - 1
        })
    };

    for (from, to, amount) in matrix.edges() {
        let i = slot(from, &mut balances);
        balances[i].1 += i128::from(amount);
        let j = slot(to, &mut balances);
        balances[j].1 -= i128::from(amount);
    }
    balances
}

/// Compute the settling debts for balanced players and their transfers.
///
/// Deterministic for a given player and transfer order. Fails with
/// [`SettleError::Invariant`] if the adjusted balances do not sum to zero.
pub fn minimize(players: &[Player], transfers: &[DirectTransfer]) -> SettleResult<Vec<Debt>> {
    let matrix = TransferMatrix::consolidate(transfers)?;
    debug!(edges = matrix.len(), transfers = transfers.len(), "consolidated transfer matrix");

    let balances = adjusted_balances(players, &matrix);
    let total: i128 = balances.iter().map(|(_, b)| *b).sum();
    if total != 0 {
        return Err(SettleError::Invariant(format!(
            "adjusted balances sum to {total}, expected 0"
        )));
    }
    debug!(?balances, "adjusted balances");

    let debtors: Vec<(&PlayerId, i128)> = balances
        .iter()
        .filter(|(_, b)| *b < 0)
        .map(|(id, b)| (id, -*b))
        .collect();
    let creditors: Vec<(&PlayerId, i128)> = balances
        .iter()
        .filter(|(_, b)| *b > 0)
        .map(|(id, b)| (id, *b))
        .collect();

    let mut debts = Vec::new();
    let (mut d, mut c) = (0, 0);
    let mut owes = debtors.first().map_or(0, |(_, v)| *v);
    let mut owed = creditors.first().map_or(0, |(_, v)| *v);

    while d < debtors.len() && c < creditors.len() {
        let amount = owes.min(owed);
        if amount > 0 {
            let amount = Amount::try_from(amount)
                .map_err(|_| SettleError::Invariant(format!("debt of {amount} out of range")))?;
            debts.push(Debt::new(debtors[d].0.clone(), creditors[c].0.clone(), amount));
        }
        owes -= amount;
        owed -= amount;
        if owes == 0 {
            d += 1;
            owes = debtors.get(d).map_or(0, |(_, v)| *v);
        }
        if owed == 0 {
            c += 1;
            owed = creditors.get(c).map_or(0, |(_, v)| *v);
        }
    }

    debug!(debts = debts.len(), "debts minimized");
    Ok(debts)
}
