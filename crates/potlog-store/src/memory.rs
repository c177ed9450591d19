use std::collections::HashMap;
use std::sync::RwLock;

use potlog_types::{NumericCode, Session, SessionStatus};

use crate::error::{StoreError, StoreResult};
use crate::traits::SessionStore;
use crate::update::SessionUpdate;

/// In-memory, HashMap-based session store.
///
/// Intended for tests, the CLI server, and embedding. Updates are applied to
/// a copy under the write lock and swapped in only on success, which gives
/// per-document atomicity.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<NumericCode, Session>>,
}

impl InMemorySessionStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of sessions currently stored.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn find_by_numeric_id(&self, code: NumericCode) -> StoreResult<Option<Session>> {
        let map = self.sessions.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(&code).cloned())
    }

    fn update_fields(&self, code: NumericCode, update: &SessionUpdate) -> StoreResult<Session> {
        let mut map = self.sessions.write().map_err(|_| StoreError::LockPoisoned)?;
        let current = map.get(&code).ok_or(StoreError::NotFound(code))?;
        let next = update.applied_to(current)?;
        map.insert(code, next.clone());
        Ok(next)
    }

    fn insert_unique(&self, session: &Session) -> StoreResult<()> {
        let mut map = self.sessions.write().map_err(|_| StoreError::LockPoisoned)?;
        if map.contains_key(&session.numeric_id) {
            return Err(StoreError::DuplicateCode(session.numeric_id));
        }
        map.insert(session.numeric_id, session.clone());
        Ok(())
    }

    fn find_settled_by_user(&self, user_id: &str) -> StoreResult<Vec<Session>> {
        let map = self.sessions.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut found: Vec<Session> = map
            .values()
            .filter(|s| s.status == SessionStatus::Settled)
            .filter(|s| s.players.iter().any(|p| p.user_id.as_deref() == Some(user_id)))
            .cloned()
            .collect();
        found.sort_by_key(|s| s.numeric_id);
        Ok(found)
    }
}

impl std::fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionStore")
            .field("session_count", &self.len())
            .finish()
    }
}
