use potlog_types::{NumericCode, Session};

use crate::error::StoreResult;
use crate::update::SessionUpdate;

/// Document store for sessions.
///
/// All implementations must satisfy these invariants:
/// - `update_fields` is atomic per document: the whole [`SessionUpdate`] is
///   applied, or the stored session is left untouched.
/// - Preconditions carried by the update are evaluated against the stored
///   document at apply time, not against the caller's snapshot.
/// - `insert_unique` rejects an existing code with `DuplicateCode` and
///   never overwrites.
pub trait SessionStore: Send + Sync {
    /// Look a session up by its numeric code.
    ///
    /// Returns `Ok(None)` if no session has that code.
    fn find_by_numeric_id(&self, code: NumericCode) -> StoreResult<Option<Session>>;

    /// Atomically apply a set of field operations and return the refreshed
    /// session.
    fn update_fields(&self, code: NumericCode, update: &SessionUpdate) -> StoreResult<Session>;

    /// Insert a new session, failing with `DuplicateCode` if its code exists.
    fn insert_unique(&self, session: &Session) -> StoreResult<()>;

    /// All SETTLED sessions with a player linked to `user_id`.
    fn find_settled_by_user(&self, user_id: &str) -> StoreResult<Vec<Session>>;
}
