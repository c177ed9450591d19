//! Directory-backed session store.
//!
//! Layout: one `<code>.json` document per session under the root directory.
//! Every write goes to a temp file in the same directory that is published
//! only once complete, so a reader never observes a half-written session and
//! a failed write leaves no document behind.

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use potlog_types::{NumericCode, Session, SessionStatus};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::SessionStore;
use crate::update::SessionUpdate;

/// Session store persisting JSON documents in a directory.
#[derive(Debug)]
pub struct FileSessionStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, code: NumericCode) -> PathBuf {
        self.root.join(format!("{code}.json"))
    }

    fn read_document(path: &Path) -> StoreResult<Option<Session>> {
        match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn encode(session: &Session) -> StoreResult<Vec<u8>> {
        serde_json::to_vec_pretty(session).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Write through a temp file and publish it at `path`.
    ///
    /// With `replace` unset an existing document is left alone and the call
    /// fails with `AlreadyExists`. The temp file is removed on any error.
    fn publish(
        &self,
        path: &Path,
        replace: bool,
        write: impl FnOnce(&mut NamedTempFile) -> io::Result<()>,
    ) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        write(&mut tmp)?;
        tmp.as_file().sync_all()?;
        let published = if replace {
            tmp.persist(path)
        } else {
            tmp.persist_noclobber(path)
        };
        published.map(|_| ()).map_err(|e| e.error)
    }

    fn replace_document(&self, session: &Session) -> StoreResult<()> {
        let bytes = Self::encode(session)?;
        let path = self.document_path(session.numeric_id);
        self.publish(&path, true, |file| file.write_all(&bytes))?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn find_by_numeric_id(&self, code: NumericCode) -> StoreResult<Option<Session>> {
        Self::read_document(&self.document_path(code))
    }

    fn update_fields(&self, code: NumericCode, update: &SessionUpdate) -> StoreResult<Session> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let current =
            Self::read_document(&self.document_path(code))?.ok_or(StoreError::NotFound(code))?;
        let next = update.applied_to(&current)?;
        self.replace_document(&next)?;
        debug!(%code, ops = update.ops.len(), "session document updated");
        Ok(next)
    }

    fn insert_unique(&self, session: &Session) -> StoreResult<()> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let path = self.document_path(session.numeric_id);
        if path.exists() {
            return Err(StoreError::DuplicateCode(session.numeric_id));
        }
        let bytes = Self::encode(session)?;
        match self.publish(&path, false, |file| file.write_all(&bytes)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::DuplicateCode(session.numeric_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find_settled_by_user(&self, user_id: &str) -> StoreResult<Vec<Session>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(session) = Self::read_document(&path)? else {
                continue;
            };
            if session.status == SessionStatus::Settled
                && session
                    .players
                    .iter()
                    .any(|p| p.user_id.as_deref() == Some(user_id))
            {
                found.push(session);
            }
        }
        found.sort_by_key(|s| s.numeric_id);
        Ok(found)
    }
}
