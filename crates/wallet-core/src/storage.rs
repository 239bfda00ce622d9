//! Durable key/value persistence.
//!
//! Everything the wallet remembers between sessions lives under four string
//! keys. [`KeyValueStore`] is the port; [`MemoryStore`] backs tests and
//! [`FileStore`] keeps the same map in a JSON file on disk.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::StorageError;

/// Mnemonic phrase.
pub const SEED_PHRASE_KEY: &str = "seedPhrase";
/// JSON array of `{name, publicKey, secretKey}`.
pub const WALLETS_KEY: &str = "wallets";
/// Decimal string holding the next derivation index.
pub const WALLET_COUNT_KEY: &str = "walletCount";
/// Single-slot handoff of a secret key to the transfer screen.
pub const SEND_KEY_SLOT: &str = "privatekeyforsending";

/// String key/value persistence. Each call is one independent write; there
/// is no transaction spanning several keys.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|_| StorageError::Io("store lock poisoned".into()))
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries)?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// A JSON object file holding the whole map.
///
/// The file is read once on open and rewritten after every mutation through
/// a temporary sibling file and a rename, so a crash never leaves a torn file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, starting empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| StorageError::Corrupt {
                key: path.display().to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "opened wallet store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Io(format!("serialize store: {e}")))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        // Holds secret keys in the clear: owner-only from creation.
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            options.mode(0o600);
            // A stale temp file keeps its old mode; tighten it before writing.
            let file = options.open(&tmp)?;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
            write_and_sync(file, body.as_bytes())?;
        }
        #[cfg(not(unix))]
        write_and_sync(options.open(&tmp)?, body.as_bytes())?;

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn write_and_sync(mut file: fs::File, body: &[u8]) -> std::io::Result<()> {
    file.write_all(body)?;
    file.sync_all()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries)?;
        let previous = entries.insert(key.to_owned(), value.to_owned());
        if let Err(e) = self.flush(&entries) {
            // Keep memory in step with disk.
            match previous {
                Some(old) => entries.insert(key.to_owned(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries)?;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush(&entries) {
            entries.insert(key.to_owned(), previous);
            return Err(e);
        }
        Ok(())
    }
}
