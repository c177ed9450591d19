//! Session document storage for Potlog.
//!
//! Every session is one document keyed by its [`NumericCode`]. The settlement
//! core never mutates a stored session in place: it reads a snapshot,
//! computes new values, and submits a [`SessionUpdate`] that the store
//! applies atomically.
//!
//! # Storage Backends
//!
//! All backends implement the [`SessionStore`] trait:
//!
//! - [`InMemorySessionStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileSessionStore`] -- one JSON document per session in a directory
//!
//! # Design Rules
//!
//! 1. An update either applies every field operation or none of them.
//! 2. Conditional updates check their preconditions under the write lock.
//! 3. `insert_unique` signals a code collision with [`StoreError::DuplicateCode`]
//!    and nothing else, so callers can retry with a fresh code.
//! 4. A missing session on read is `Ok(None)`, not an error.
//!
//! [`NumericCode`]: potlog_types::NumericCode

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;
pub mod update;

pub use error::{StoreError, StoreResult};
pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;
pub use traits::SessionStore;
pub use update::{FieldUpdate, SessionUpdate};
