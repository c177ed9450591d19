use potlog_store::{FieldUpdate, SessionUpdate};
use potlog_types::{
    Amount, Debt, DirectTransfer, EntryKind, LedgerEntry, Player, PlayerId, Session,
    SessionStatus, TransferId,
};
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};

/// Note attached to transfers synthesized from manual debt payments.
pub const SETTLEMENT_PAYMENT_NOTE: &str = "settlement payment";

/// Default cap on players per session.
pub const DEFAULT_MAX_PLAYERS: usize = 64;

/// Validated writer over a session snapshot.
///
/// The ledger never mutates the session it reads. Each operation checks its
/// inputs against the snapshot and returns the [`SessionUpdate`] that records
/// it, conditioned on the session still being ACTIVE when the store applies
/// it.
#[derive(Debug, Clone, Copy)]
pub struct Ledger<'a> {
    session: &'a Session,
    max_players: usize,
}

impl<'a> Ledger<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }

    pub fn with_max_players(mut self, max_players: usize) -> Self {
        self.max_players = max_players;
        self
    }

    pub fn session(&self) -> &'a Session {
        self.session
    }

    /// Seat a new player with an initial buy-in, recorded as a BUY_IN entry.
    pub fn add_player(
        &self,
        name: &str,
        initial_buy_in: Amount,
        user_id: Option<String>,
    ) -> LedgerResult<(Player, SessionUpdate)> {
        self.ensure_active()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        if initial_buy_in < 0 {
            return Err(LedgerError::NegativeBuyIn(initial_buy_in));
        }
        if self.session.players.len() >= self.max_players {
            return Err(LedgerError::PlayerLimitReached(self.max_players));
        }
        self.session
            .total_buy_in()
            .and_then(|total| total.checked_add(initial_buy_in))
            .ok_or(LedgerError::AmountOverflow)?;

        let mut player = Player::new(name, initial_buy_in);
        player.user_id = user_id;
        let entry = LedgerEntry::new(player.id.clone(), EntryKind::BuyIn, initial_buy_in);

        debug!(player = %player.id, buy_in = initial_buy_in, "player seated");
        let update = Self::active_update()
            .with(FieldUpdate::PushPlayer(player.clone()))
            .with(FieldUpdate::PushEntry(entry));
        Ok((player, update))
    }

    /// Add to a player's buy-in, recorded as a REBUY entry.
    pub fn rebuy(&self, player_id: &PlayerId, amount: Amount) -> LedgerResult<SessionUpdate> {
        self.ensure_active()?;
        self.require_player(player_id)?;
        if amount <= 0 {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        self.session
            .total_buy_in()
            .and_then(|total| total.checked_add(amount))
            .ok_or(LedgerError::AmountOverflow)?;

        let entry = LedgerEntry::new(player_id.clone(), EntryKind::Rebuy, amount);
        Ok(Self::active_update()
            .with(FieldUpdate::IncrementBuyIn {
                player_id: player_id.clone(),
                amount,
            })
            .with(FieldUpdate::PushEntry(entry)))
    }

    /// Record money that moved from one player to another outside the pot.
    pub fn add_transfer(
        &self,
        from: &PlayerId,
        to: &PlayerId,
        amount: Amount,
        note: Option<String>,
    ) -> LedgerResult<(DirectTransfer, SessionUpdate)> {
        self.ensure_active()?;
        self.require_player(from)?;
        self.require_player(to)?;
        if from == to {
            return Err(LedgerError::SelfTransfer);
        }
        if amount <= 0 {
            return Err(LedgerError::NonPositiveAmount(amount));
        }

        let transfer = DirectTransfer::new(from.clone(), to.clone(), amount).with_note(note);
        let update = Self::active_update().with(FieldUpdate::PushTransfer(transfer.clone()));
        Ok((transfer, update))
    }

    /// Delete a transfer. Only possible while the session is ACTIVE.
    pub fn remove_transfer(&self, transfer_id: &TransferId) -> LedgerResult<SessionUpdate> {
        self.ensure_active()?;
        if self.session.transfer(transfer_id).is_none() {
            return Err(LedgerError::TransferNotFound(transfer_id.clone()));
        }
        Ok(Self::active_update().with(FieldUpdate::PullTransfer(transfer_id.clone())))
    }

    /// Buy-in history of one player, oldest first.
    pub fn buy_in_history<'b>(
        &'b self,
        player_id: &'b PlayerId,
    ) -> impl Iterator<Item = &'a LedgerEntry> + 'b {
        self.session
            .entries
            .iter()
            .filter(move |e| &e.player_id == player_id && e.kind.counts_toward_buy_in())
    }

    fn ensure_active(&self) -> LedgerResult<()> {
        if self.session.status != SessionStatus::Active {
            return Err(LedgerError::SessionNotActive(self.session.status));
        }
        Ok(())
    }

    fn require_player(&self, id: &PlayerId) -> LedgerResult<&'a Player> {
        self.session
            .player(id)
            .ok_or_else(|| LedgerError::PlayerNotFound(id.clone()))
    }

    fn active_update() -> SessionUpdate {
        SessionUpdate::new().when_status(SessionStatus::Active)
    }
}

/// The transfer that records a manual payment against a debt.
///
/// Unlike ordinary transfers this is produced while the session is SETTLED:
/// it is evidence for the next settlement run should the session be reopened.
pub fn settlement_payment(debt: &Debt, amount: Amount) -> DirectTransfer {
    DirectTransfer::new(debt.from_player_id.clone(), debt.to_player_id.clone(), amount)
        .with_note(Some(SETTLEMENT_PAYMENT_NOTE.to_string()))
}
