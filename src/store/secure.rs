//! Key/value secret storage behind the credential store.
//!
//! On a device this is the platform keychain; here it is a trait with an
//! in-memory implementation (tests, ephemeral sessions) and a file-backed one
//! (CLI). Reads and writes are synchronous.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::core::errors::{NightlightError, Result};

/// Secret storage keyed by entry name.
pub trait SecureStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemorySecureStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl SecureStore for MemorySecureStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// JSON file store, owner-readable only, rewritten atomically on each change.
#[derive(Debug)]
pub struct FileSecureStore {
    path: PathBuf,
    cache: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileSecureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> T) -> Result<T> {
        let mut cache = self.cache.lock();
        if cache.is_none() {
            *cache = Some(read_entries(&self.path)?);
        }
        // Populated just above.
        let entries = cache.get_or_insert_with(BTreeMap::new);
        Ok(f(entries))
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        write_atomic(&self.path, entries).map_err(|source| NightlightError::io(&self.path, source))
    }
}

impl SecureStore for FileSecureStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let snapshot = self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
            entries.clone()
        })?;
        self.persist(&snapshot)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let snapshot = self.with_entries(|entries| {
            entries.remove(key).map(|_| entries.clone())
        })?;
        match snapshot {
            Some(entries) => self.persist(&entries),
            None => Ok(()),
        }
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    match fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(raw) => serde_json::from_str(&raw).map_err(|error| NightlightError::SecureStore {
            details: format!("{} is corrupt: {error}", path.display()),
        }),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(error) => Err(NightlightError::io(path, error)),
    }
}

fn write_atomic(path: &Path, entries: &BTreeMap<String, String>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)
}
