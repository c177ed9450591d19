use std::collections::{HashMap, HashSet};

use potlog_types::{NumericCode, PlayerId, Session, SessionStatus};

/// Result of session validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub numeric_id: NumericCode,
    pub player_count: usize,
    pub buy_ins_reconciled: bool,
    pub transfers_well_formed: bool,
    pub debts_bounded: bool,
    pub settlement_consistent: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific consistency violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    DuplicatePlayer,
    NegativeBuyIn,
    BuyInMismatch,
    DanglingReference,
    SelfTransfer,
    NonPositiveAmount,
    DebtOutOfBounds,
    DebtFlagMismatch,
    ResidualSettlement,
    UnbalancedNets,
}

/// Session consistency validator.
///
/// Checks the invariants the ledger and settlement engine are meant to
/// maintain, so a stored document can be audited after the fact.
pub struct SessionValidator;

impl SessionValidator {
    pub fn validate(session: &Session) -> ValidationReport {
        let mut violations = Vec::new();
        let mut buy_ins_reconciled = true;
        let mut transfers_well_formed = true;
        let mut debts_bounded = true;
        let mut settlement_consistent = true;

        let mut seen = HashSet::new();
        for player in &session.players {
            if !seen.insert(&player.id) {
                violations.push(violation(
                    ViolationKind::DuplicatePlayer,
                    format!("player id {} appears more than once", player.id),
                ));
            }
            if player.buy_in < 0 {
                buy_ins_reconciled = false;
                violations.push(violation(
                    ViolationKind::NegativeBuyIn,
                    format!("player {} has buy-in {}", player.id, player.buy_in),
                ));
            }
        }

        // Buy-ins must equal the sum of BUY_IN and REBUY entries.
        let mut logged: HashMap<&PlayerId, i128> = HashMap::new();
        for entry in session.entries.iter().filter(|e| e.kind.counts_toward_buy_in()) {
            if !seen.contains(&entry.player_id) {
                buy_ins_reconciled = false;
                violations.push(violation(
                    ViolationKind::DanglingReference,
                    format!("ledger entry {} references unknown player {}", entry.id, entry.player_id),
                ));
                continue;
            }
            *logged.entry(&entry.player_id).or_default() += i128::from(entry.amount);
        }
        for player in &session.players {
            let expected = logged.get(&player.id).copied().unwrap_or(0);
            if i128::from(player.buy_in) != expected {
                buy_ins_reconciled = false;
                violations.push(violation(
                    ViolationKind::BuyInMismatch,
                    format!(
                        "player {} buy-in is {}, ledger entries sum to {expected}",
                        player.id, player.buy_in
                    ),
                ));
            }
        }

        for transfer in &session.transfers {
            for end in [&transfer.from_player_id, &transfer.to_player_id] {
                if !seen.contains(end) {
                    transfers_well_formed = false;
                    violations.push(violation(
                        ViolationKind::DanglingReference,
                        format!("transfer {} references unknown player {end}", transfer.id),
                    ));
                }
            }
            if transfer.from_player_id == transfer.to_player_id {
                transfers_well_formed = false;
                violations.push(violation(
                    ViolationKind::SelfTransfer,
                    format!("transfer {} sends to its own sender", transfer.id),
                ));
            }
            if transfer.amount <= 0 {
                transfers_well_formed = false;
                violations.push(violation(
                    ViolationKind::NonPositiveAmount,
                    format!("transfer {} has amount {}", transfer.id, transfer.amount),
                ));
            }
        }

        for debt in &session.debts {
            if debt.amount <= 0 || debt.settled_amount < 0 || debt.settled_amount > debt.amount {
                debts_bounded = false;
                violations.push(violation(
                    ViolationKind::DebtOutOfBounds,
                    format!(
                        "debt {} has settled {} of {}",
                        debt.id, debt.settled_amount, debt.amount
                    ),
                ));
            }
            if debt.settled != (debt.settled_amount >= debt.amount) {
                debts_bounded = false;
                violations.push(violation(
                    ViolationKind::DebtFlagMismatch,
                    format!("debt {} settled flag disagrees with its progress", debt.id),
                ));
            }
        }

        match session.status {
            SessionStatus::Active => {
                let residual = !session.debts.is_empty()
                    || session.settled_at.is_some()
                    || session.players.iter().any(|p| p.cash_out != 0 || p.net != 0);
                if residual {
                    settlement_consistent = false;
                    violations.push(violation(
                        ViolationKind::ResidualSettlement,
                        "active session carries settlement results".into(),
                    ));
                }
            }
            SessionStatus::Settled => {
                let total: i128 = session.players.iter().map(|p| i128::from(p.net)).sum();
                if total != 0 {
                    settlement_consistent = false;
                    violations.push(violation(
                        ViolationKind::UnbalancedNets,
                        format!("settled nets sum to {total}"),
                    ));
                }
            }
        }

        ValidationReport {
            numeric_id: session.numeric_id,
            player_count: session.players.len(),
            buy_ins_reconciled,
            transfers_well_formed,
            debts_bounded,
            settlement_consistent,
            violations,
        }
    }
}

fn violation(kind: ViolationKind, description: String) -> Violation {
    Violation { kind, description }
}
