//! Durable storage for the session token.
//!
//! Exactly one token is stored, under the fixed key [`TOKEN_KEY`]. Every backend makes
//! its writes durable before returning, and `clear` is idempotent.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AuthError;

/// Key under which the token is stored, in every backend.
pub const TOKEN_KEY: &str = "token";

/// Keychain service name
const SERVICE_NAME: &str = "parkdesk";

/// Token file name in the cache directory
const TOKEN_FILE: &str = "token.json";

// ============================================================================
// Token
// ============================================================================

/// Opaque bearer credential. Never empty.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token, rejecting empty or whitespace-only values.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// Tokens end up in structured log fields; keep them out of Debug output.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<{} bytes>)", self.0.len())
    }
}

// ============================================================================
// Store trait
// ============================================================================

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the stored token, if any.
    async fn get(&self) -> Result<Option<Token>, AuthError>;

    /// Store the token, replacing any previous value.
    async fn set(&self, token: &Token) -> Result<(), AuthError>;

    /// Remove the stored token. Succeeds if nothing was stored.
    async fn clear(&self) -> Result<(), AuthError>;
}

/// Which backend holds the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    File,
    Keyring,
    Memory,
}

impl StoreKind {
    /// Build the configured store. File-backed tokens live in `cache_dir`.
    pub fn open(self, cache_dir: &Path) -> Arc<dyn CredentialStore> {
        debug!(kind = ?self, "Opening credential store");
        match self {
            StoreKind::File => Arc::new(FileCredentialStore::new(cache_dir.join(TOKEN_FILE))),
            StoreKind::Keyring => Arc::new(KeyringCredentialStore::new(SERVICE_NAME)),
            StoreKind::Memory => Arc::new(MemoryCredentialStore::new()),
        }
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StoreKind::File),
            "keyring" | "keychain" => Ok(StoreKind::Keyring),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("Unknown token store type: {}", other)),
        }
    }
}

/// Run blocking storage work off the async runtime.
async fn run_blocking<T, F>(work: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::StorageUnavailable(format!("Storage task failed: {}", e)))?
}

// ============================================================================
// File backend
// ============================================================================

/// On-disk layout of the token record.
#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    token: String,
    saved_at: DateTime<Utc>,
}

/// Token stored as a JSON record in a file.
///
/// Writes go to a sibling temp file which is synced and then renamed over the record,
/// so a crash leaves either the old record or the new one.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(path: &Path) -> Result<Option<Token>, AuthError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AuthError::StorageUnavailable(format!(
                    "Failed to read token file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let record: TokenRecord = serde_json::from_str(&contents).map_err(|e| {
            AuthError::StorageUnavailable(format!("Token file is corrupted: {}", e))
        })?;

        Token::new(record.token)
            .map(Some)
            .ok_or_else(|| AuthError::StorageUnavailable("Token file holds an empty token".into()))
    }

    fn write_record(path: &Path, token: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = TokenRecord {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_vec_pretty(&record)?;

        let tmp_path = path.with_extension("json.tmp");
        {
            let mut options = OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&tmp_path)?;
            file.write_all(&contents)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;

        #[cfg(unix)]
        {
            if let Some(parent) = path.parent() {
                File::open(parent)?.sync_all()?;
            }
        }
        Ok(())
    }

    fn remove_record(path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<Token>, AuthError> {
        let path = self.path.clone();
        run_blocking(move || Self::read_record(&path)).await
    }

    async fn set(&self, token: &Token) -> Result<(), AuthError> {
        let path = self.path.clone();
        let token = token.as_str().to_string();
        run_blocking(move || {
            Self::write_record(&path, &token).map_err(|e| {
                AuthError::StorageUnavailable(format!(
                    "Failed to write token file {}: {}",
                    path.display(),
                    e
                ))
            })
        })
        .await
    }

    async fn clear(&self) -> Result<(), AuthError> {
        let path = self.path.clone();
        run_blocking(move || {
            Self::remove_record(&path).map_err(|e| {
                AuthError::StorageUnavailable(format!(
                    "Failed to remove token file {}: {}",
                    path.display(),
                    e
                ))
            })
        })
        .await
    }
}

// ============================================================================
// Keyring backend
// ============================================================================

/// Token stored in the OS keychain.
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(service: &str) -> Result<Entry, AuthError> {
        Entry::new(service, TOKEN_KEY).map_err(|e| {
            AuthError::StorageUnavailable(format!("Failed to create keyring entry: {}", e))
        })
    }
}

/// A keychain entry that exists but holds only whitespace is damaged, not absent.
fn keychain_token(value: String) -> Result<Token, AuthError> {
    Token::new(value)
        .ok_or_else(|| AuthError::StorageUnavailable("Keychain holds an empty token".into()))
}

#[async_trait]
impl CredentialStore for KeyringCredentialStore {
    async fn get(&self) -> Result<Option<Token>, AuthError> {
        let service = self.service.clone();
        run_blocking(move || match Self::entry(&service)?.get_password() {
            Ok(value) => keychain_token(value).map(Some),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AuthError::StorageUnavailable(format!(
                "Failed to retrieve token from keychain: {}",
                e
            ))),
        })
        .await
    }

    async fn set(&self, token: &Token) -> Result<(), AuthError> {
        let service = self.service.clone();
        let token = token.as_str().to_string();
        run_blocking(move || {
            Self::entry(&service)?.set_password(&token).map_err(|e| {
                AuthError::StorageUnavailable(format!("Failed to store token in keychain: {}", e))
            })
        })
        .await
    }

    async fn clear(&self) -> Result<(), AuthError> {
        let service = self.service.clone();
        run_blocking(move || match Self::entry(&service)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AuthError::StorageUnavailable(format!(
                "Failed to delete token from keychain: {}",
                e
            ))),
        })
        .await
    }
}

// ============================================================================
// Memory backend
// ============================================================================

/// Process-local store. Lives exactly as long as the value.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Token>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a token.
    pub fn with_token(token: Token) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Token>>, AuthError> {
        self.slot
            .lock()
            .map_err(|_| AuthError::StorageUnavailable("Memory store lock poisoned".into()))
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<Token>, AuthError> {
        Ok(self.lock()?.clone())
    }

    async fn set(&self, token: &Token) -> Result<(), AuthError> {
        *self.lock()? = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AuthError> {
        *self.lock()? = None;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn token(s: &str) -> Token {
        Token::new(s).expect("non-empty test token")
    }

    #[test]
    fn test_token_rejects_empty() {
        assert!(Token::new("").is_none());
        assert!(Token::new("   ").is_none());
        assert_eq!(Token::new("abc").map(Token::into_inner), Some("abc".to_string()));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let rendered = format!("{:?}", token("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert_eq!(rendered, "Token(<12 bytes>)");
    }

    #[test]
    fn test_store_kind_from_str() {
        assert_eq!("file".parse::<StoreKind>(), Ok(StoreKind::File));
        assert_eq!("Keychain".parse::<StoreKind>(), Ok(StoreKind::Keyring));
        assert_eq!(" memory ".parse::<StoreKind>(), Ok(StoreKind::Memory));
        assert!("redis".parse::<StoreKind>().is_err());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_absent() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));
        assert_eq!(store.get().await, Ok(None));
    }

    #[tokio::test]
    async fn test_file_store_set_then_get() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");
        let store = FileCredentialStore::new(path.clone());

        store.set(&token("tok123")).await.unwrap();
        assert_eq!(store.get().await, Ok(Some(token("tok123"))));

        // Overwrite replaces the value and leaves no temp file behind
        store.set(&token("tok456")).await.unwrap();
        assert_eq!(store.get().await, Ok(Some(token("tok456"))));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_survives_new_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");

        FileCredentialStore::new(path.clone())
            .set(&token("persisted"))
            .await
            .unwrap();

        let reopened = FileCredentialStore::new(path);
        assert_eq!(reopened.get().await, Ok(Some(token("persisted"))));
    }

    #[tokio::test]
    async fn test_file_store_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token.json"));

        store.clear().await.unwrap();
        store.set(&token("tok")).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.get().await, Ok(None));
    }

    #[tokio::test]
    async fn test_file_store_corrupted_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileCredentialStore::new(path);
        assert!(matches!(store.get().await, Err(AuthError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_file_store_empty_token_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, r#"{"token":"","saved_at":"2024-01-01T00:00:00Z"}"#).unwrap();

        let store = FileCredentialStore::new(path);
        assert!(matches!(store.get().await, Err(AuthError::StorageUnavailable(_))));
    }

    #[test]
    fn test_blank_keychain_entry_is_unavailable() {
        assert!(matches!(
            keychain_token("   ".to_string()),
            Err(AuthError::StorageUnavailable(_))
        ));
        assert!(matches!(
            keychain_token(String::new()),
            Err(AuthError::StorageUnavailable(_))
        ));
        assert_eq!(
            keychain_token("tok".to_string()).map(Token::into_inner).ok(),
            Some("tok".to_string())
        );
    }

    #[tokio::test]
    async fn test_file_store_unreadable_path() {
        let dir = tempdir().unwrap();
        // A directory where the record should be cannot be read as a file
        let path = dir.path().join("token.json");
        std::fs::create_dir(&path).unwrap();

        let store = FileCredentialStore::new(path);
        assert!(matches!(store.get().await, Err(AuthError::StorageUnavailable(_))));
        assert!(matches!(
            store.set(&token("tok")).await,
            Err(AuthError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get().await, Ok(None));

        store.set(&token("abc")).await.unwrap();
        assert_eq!(store.get().await, Ok(Some(token("abc"))));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.get().await, Ok(None));
    }
}
