//! Bearer token persistence.
//!
//! The session is a single opaque bearer token kept under [`TOKEN_KEY`] in
//! client storage. Its presence means "possibly authenticated"; only a
//! successful `GET /auth/user` confirms it.
//!
//! [`FileTokenStore`] keeps a small JSON object on disk so other client
//! preferences can share the file; unknown keys are preserved on write.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use zeroize::Zeroizing;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "auth_token";

/// An opaque bearer token. Zeroed on drop, redacted in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// The raw token, for the `Authorization` header only.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Token storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("corrupt session file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Where the bearer token lives between runs.
///
/// Implementations must be `Send + Sync`; the API client shares one store
/// across every request and clears it on 401.
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Current token, if any.
    fn load(&self) -> Result<Option<AuthToken>, StorageError>;

    /// Persist a token, replacing any previous one.
    fn save(&self, token: &AuthToken) -> Result<(), StorageError>;

    /// Remove the token. Removing an absent token is not an error.
    fn clear(&self) -> Result<(), StorageError>;

    /// Whether a token is stored. Storage failures count as absent.
    fn is_present(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}

/// In-process token storage for tests and one-shot commands.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<AuthToken>>,
}

impl MemoryTokenStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token.
    pub fn with_token(raw: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(AuthToken::new(raw))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, StorageError> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &AuthToken) -> Result<(), StorageError> {
        *self.token.lock() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.lock() = None;
        Ok(())
    }
}

/// JSON key/value file holding the token under [`TOKEN_KEY`].
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    /// Store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `$EXPD_STATE_DIR/session.json`, else `$HOME/.expd/session.json`,
    /// else `.expd/session.json` in the working directory.
    pub fn default_path() -> PathBuf {
        let dir = std::env::var_os("EXPD_STATE_DIR")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".expd")))
            .unwrap_or_else(|| PathBuf::from(".expd"));
        dir.join("session.json")
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<serde_json::Map<String, serde_json::Value>, StorageError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Default::default()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Default::default());
        }
        serde_json::from_slice(&raw).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_map(
        &self,
        map: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_vec_pretty(map).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        // Write-then-rename so a crash never leaves a truncated file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(io_err)?;
        restrict_permissions(&tmp).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AuthToken>, StorageError> {
        let map = self.read_map()?;
        Ok(map
            .get(TOKEN_KEY)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(AuthToken::new))
    }

    fn save(&self, token: &AuthToken) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut map = self.read_map()?;
        map.insert(
            TOKEN_KEY.to_string(),
            serde_json::Value::String(token.as_str().to_string()),
        );
        self.write_map(&map)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut map = self.read_map()?;
        if map.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_debug_is_redacted() {
        let token = AuthToken::new("secret-value");
        assert!(!format!("{token:?}").contains("secret-value"));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(!store.is_present());
        store.save(&AuthToken::new("t1")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().as_str(), "t1");
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        FileTokenStore::new(&path).save(&AuthToken::new("abc")).unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.load().unwrap().unwrap().as_str(), "abc");
        reopened.clear().unwrap();
        assert!(!FileTokenStore::new(&path).is_present());
    }

    #[test]
    fn file_store_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"sidebar_state": "collapsed"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.save(&AuthToken::new("abc")).unwrap();
        store.clear().unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["sidebar_state"], "collapsed");
        assert!(raw.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn missing_file_means_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileTokenStore::new(&path);
        assert!(matches!(store.load(), Err(StorageError::Corrupt { .. })));
        assert!(!store.is_present());
    }
}
