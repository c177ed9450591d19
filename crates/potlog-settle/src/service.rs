use std::sync::Arc;

use potlog_ledger::{Ledger, LedgerError, DEFAULT_MAX_PLAYERS};
use potlog_store::{SessionStore, SessionUpdate, StoreError};
use potlog_types::{Amount, NumericCode, PlayerId, Session, TransferId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{SettleError, SettleResult};
use crate::stats::UserStats;

/// Default number of codes tried before session creation gives up.
pub const DEFAULT_ID_ALLOCATION_ATTEMPTS: usize = 10;

/// Tunables for [`SessionService`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub max_players: usize,
    pub id_allocation_attempts: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            id_allocation_attempts: DEFAULT_ID_ALLOCATION_ATTEMPTS,
        }
    }
}

/// Session creation and ACTIVE-phase recording over a store.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    config: ServiceConfig,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_config(store, ServiceConfig::default())
    }

    pub fn with_config(store: Arc<dyn SessionStore>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Create an ACTIVE session under a fresh random code.
    pub fn create_session(&self, stakes: &str) -> SettleResult<Session> {
        self.create_session_with_rng(stakes, &mut rand::thread_rng())
    }

    /// Create a session, drawing codes from `rng` until one is free or the
    /// attempt budget runs out.
    pub fn create_session_with_rng<R: Rng>(
        &self,
        stakes: &str,
        rng: &mut R,
    ) -> SettleResult<Session> {
        let attempts = self.config.id_allocation_attempts;
        for attempt in 1..=attempts {
            let session = Session::new(NumericCode::random(rng), stakes);
            match self.store.insert_unique(&session) {
                Ok(()) => {
                    info!(code = %session.numeric_id, attempt, "session created");
                    return Ok(session);
                }
                Err(StoreError::DuplicateCode(code)) => {
                    warn!(%code, attempt, "session code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(SettleError::AllocationExhausted(attempts))
    }

    pub fn get_session(&self, code: NumericCode) -> SettleResult<Session> {
        self.store
            .find_by_numeric_id(code)?
            .ok_or(SettleError::SessionNotFound(code))
    }

    pub fn add_player(
        &self,
        code: NumericCode,
        name: &str,
        initial_buy_in: Amount,
        user_id: Option<String>,
    ) -> SettleResult<Session> {
        let session = self.get_session(code)?;
        let (player, update) = self
            .ledger(&session)
            .add_player(name, initial_buy_in, user_id)?;
        let session = self.commit(code, &update)?;
        info!(%code, player = %player.id, buy_in = initial_buy_in, "player added");
        Ok(session)
    }

    pub fn rebuy(
        &self,
        code: NumericCode,
        player_id: &PlayerId,
        amount: Amount,
    ) -> SettleResult<Session> {
        let session = self.get_session(code)?;
        let update = self.ledger(&session).rebuy(player_id, amount)?;
        let session = self.commit(code, &update)?;
        info!(%code, player = %player_id, amount, "rebuy recorded");
        Ok(session)
    }

    pub fn add_transfer(
        &self,
        code: NumericCode,
        from: &PlayerId,
        to: &PlayerId,
        amount: Amount,
        note: Option<String>,
    ) -> SettleResult<Session> {
        let session = self.get_session(code)?;
        let (transfer, update) = self
            .ledger(&session)
            .add_transfer(from, to, amount, note)?;
        let session = self.commit(code, &update)?;
        info!(%code, transfer = %transfer.id, %from, %to, amount, "transfer recorded");
        Ok(session)
    }

    pub fn remove_transfer(
        &self,
        code: NumericCode,
        transfer_id: &TransferId,
    ) -> SettleResult<Session> {
        let session = self.get_session(code)?;
        let update = self.ledger(&session).remove_transfer(transfer_id)?;
        let session = self.commit(code, &update)?;
        info!(%code, transfer = %transfer_id, "transfer removed");
        Ok(session)
    }

    /// Results of a linked user across every settled session.
    pub fn user_stats(&self, user_id: &str) -> SettleResult<UserStats> {
        let sessions = self.store.find_settled_by_user(user_id)?;
        UserStats::from_sessions(user_id, &sessions)
    }

    fn ledger<'a>(&self, session: &'a Session) -> Ledger<'a> {
        Ledger::new(session).with_max_players(self.config.max_players)
    }

    /// Apply a ledger update. A status change since the snapshot was read
    /// surfaces as the same error the ledger raises for a non-ACTIVE session.
    fn commit(&self, code: NumericCode, update: &SessionUpdate) -> SettleResult<Session> {
        self.store.update_fields(code, update).map_err(|e| match e {
            StoreError::StatusMismatch { actual, .. } => LedgerError::SessionNotActive(actual).into(),
            StoreError::NotFound(code) => SettleError::SessionNotFound(code),
            StoreError::ElementNotFound { kind: "player", id } => {
                LedgerError::PlayerNotFound(id.into()).into()
            }
            StoreError::ElementNotFound { kind: "transfer", id } => {
                LedgerError::TransferNotFound(id.into()).into()
            }
            other => other.into(),
        })
    }
}
