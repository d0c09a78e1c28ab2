//! Credential persistence.
//!
//! A `TokenStore` only persists; the live copy of the pair is owned by the
//! `SessionManager`. Both tokens are always written and cleared together.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::errors::StoreError;

/// Access/refresh credential pair issued by the auth backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens never appear in logs.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<TokenPair>, StoreError>;
    async fn save(&self, pair: &TokenPair) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Process-lifetime store. Used for tests and embedding.
#[derive(Default)]
pub struct MemoryTokenStore {
    pair: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            pair: RwLock::new(Some(pair)),
        }
    }

    /// Snapshot of what is currently persisted.
    pub async fn snapshot(&self) -> Option<TokenPair> {
        self.pair.read().await.clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<TokenPair>, StoreError> {
        Ok(self.pair.read().await.clone())
    }

    async fn save(&self, pair: &TokenPair) -> Result<(), StoreError> {
        *self.pair.write().await = Some(pair.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.pair.write().await = None;
        Ok(())
    }
}

/// JSON file store; survives process restarts.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<TokenPair>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, pair: &TokenPair) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Write-then-rename so a crash never leaves half a pair on disk.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(pair)?).await?;
        restrict_permissions(&tmp).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
