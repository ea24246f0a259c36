//! Ledger persistence. Documents are written atomically (temp file,
//! fsync, rename) under an advisory file lock so concurrent paka
//! processes cannot interleave partial writes.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;

use crate::core::Scope;
use crate::error::{PakaError, Result};
use crate::history::LedgerDocument;
use crate::utils::paths;

const LOCK_FILE_NAME: &str = "history.lock";

/// Storage seam for the ledger. Filesystem in production, in-memory in
/// tests.
pub trait LedgerStore {
    fn load(&self, scope: Scope) -> Result<Option<LedgerDocument>>;
    fn save(&mut self, scope: Scope, doc: &LedgerDocument) -> Result<()>;
}

pub struct FilesystemLedgerStore {
    user_file: PathBuf,
    system_file: PathBuf,
}

impl FilesystemLedgerStore {
    /// Standard per-scope locations under the data directories.
    pub fn discover() -> Result<Self> {
        Ok(Self {
            user_file: paths::history_file(Scope::User)?,
            system_file: paths::history_file(Scope::System)?,
        })
    }

    /// Explicit paths, used by tests to point at a tempdir.
    pub fn at(user_file: PathBuf, system_file: PathBuf) -> Self {
        Self {
            user_file,
            system_file,
        }
    }

    fn file_for(&self, scope: Scope) -> &PathBuf {
        match scope {
            Scope::User => &self.user_file,
            Scope::System => &self.system_file,
        }
    }

    fn lock(&self, scope: Scope) -> Result<File> {
        let dir = self
            .file_for(scope)
            .parent()
            .ok_or_else(|| PakaError::PathError("history file has no parent".into()))?;
        fs::create_dir_all(dir).map_err(|e| PakaError::IoError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let lock_path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| PakaError::IoError {
                path: lock_path.clone(),
                source: e,
            })?;
        file.lock_exclusive()
            .map_err(|e| PakaError::LockError(format!("{}: {}", lock_path.display(), e)))?;
        Ok(file)
    }
}

impl LedgerStore for FilesystemLedgerStore {
    fn load(&self, scope: Scope) -> Result<Option<LedgerDocument>> {
        let path = self.file_for(scope);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|e| PakaError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let doc = serde_json::from_str(&content)?;
        Ok(Some(doc))
    }

    fn save(&mut self, scope: Scope, doc: &LedgerDocument) -> Result<()> {
        let path = self.file_for(scope).clone();
        let _lock = self.lock(scope)?;
        let json = serde_json::to_string_pretty(doc)?;
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp).map_err(|e| PakaError::IoError {
                path: tmp.clone(),
                source: e,
            })?;
            file.write_all(json.as_bytes())
                .map_err(|e| PakaError::IoError {
                    path: tmp.clone(),
                    source: e,
                })?;
            file.sync_all().map_err(|e| PakaError::IoError {
                path: tmp.clone(),
                source: e,
            })?;
        }
        fs::rename(&tmp, &path).map_err(|e| PakaError::IoError {
            path: path.clone(),
            source: e,
        })?;
        Ok(())
    }
}

/// In-memory store for unit and integration tests.
#[derive(Default)]
pub struct MemoryLedgerStore {
    user: Option<LedgerDocument>,
    system: Option<LedgerDocument>,
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self, scope: Scope) -> Result<Option<LedgerDocument>> {
        Ok(match scope {
            Scope::User => self.user.clone(),
            Scope::System => self.system.clone(),
        })
    }

    fn save(&mut self, scope: Scope, doc: &LedgerDocument) -> Result<()> {
        match scope {
            Scope::User => self.user = Some(doc.clone()),
            Scope::System => self.system = Some(doc.clone()),
        }
        Ok(())
    }
}
