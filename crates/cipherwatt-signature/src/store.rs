//! Signature store implementations
//!
//! [`InMemorySignatureStore`] keeps authorizations for the lifetime of the
//! process. [`FileSignatureStore`] persists them as a JSON document so a
//! reload does not prompt the wallet again while the window is still open.

use async_trait::async_trait;
use cipherwatt_core::{AuthorizationKey, CipherwattError, DecryptionAuthorization, SignatureStore};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Process-local signature store.
#[derive(Debug, Default)]
pub struct InMemorySignatureStore {
    entries: RwLock<HashMap<AuthorizationKey, DecryptionAuthorization>>,
}

impl InMemorySignatureStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached authorizations
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SignatureStore for InMemorySignatureStore {
    async fn get(
        &self,
        key: &AuthorizationKey,
    ) -> Result<Option<DecryptionAuthorization>, CipherwattError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(
        &self,
        key: &AuthorizationKey,
        authorization: DecryptionAuthorization,
    ) -> Result<(), CipherwattError> {
        self.entries.write().insert(key.clone(), authorization);
        Ok(())
    }

    async fn remove(&self, key: &AuthorizationKey) -> Result<bool, CipherwattError> {
        Ok(self.entries.write().remove(key).is_some())
    }
}

/// Opaque storage name for a cache key.
///
/// Keeps identity and contract addresses out of the file's key names.
pub fn opaque_key_name(key: &AuthorizationKey) -> String {
    let digest = Sha256::digest(key.canonical().as_bytes());
    hex::encode(digest)
}

/// Owner-only mode for the cache document; it holds ephemeral private keys.
pub const CACHE_FILE_MODE: u32 = 0o600;

/// JSON-file backed signature store.
///
/// The whole document is rewritten on every change through a temporary file
/// and a rename, so a crash leaves either the old or the new document.
#[derive(Debug)]
pub struct FileSignatureStore {
    path: PathBuf,
    lock: tokio::sync::RwLock<()>,
}

impl FileSignatureStore {
    /// Store backed by `path`; the file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::RwLock::new(()),
        }
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, DecryptionAuthorization>, CipherwattError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(
        &self,
        entries: &BTreeMap<String, DecryptionAuthorization>,
    ) -> Result<(), CipherwattError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let document = serde_json::to_vec_pretty(entries)?;

        let tmp = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp).await?;
        restrict_to_owner(&tmp).await?;
        file.write_all(&document).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), entries = entries.len(), "Persisted signature store");
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_to_owner(path: &Path) -> Result<(), CipherwattError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(CACHE_FILE_MODE)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_to_owner(_path: &Path) -> Result<(), CipherwattError> {
    Ok(())
}

#[async_trait]
impl SignatureStore for FileSignatureStore {
    async fn get(
        &self,
        key: &AuthorizationKey,
    ) -> Result<Option<DecryptionAuthorization>, CipherwattError> {
        let _guard = self.lock.read().await;
        let mut entries = self.load().await?;
        Ok(entries.remove(&opaque_key_name(key)))
    }

    async fn set(
        &self,
        key: &AuthorizationKey,
        authorization: DecryptionAuthorization,
    ) -> Result<(), CipherwattError> {
        let _guard = self.lock.write().await;
        let mut entries = self.load().await?;
        entries.insert(opaque_key_name(key), authorization);
        self.persist(&entries).await
    }

    async fn remove(&self, key: &AuthorizationKey) -> Result<bool, CipherwattError> {
        let _guard = self.lock.write().await;
        let mut entries = self.load().await?;
        let existed = entries.remove(&opaque_key_name(key)).is_some();
        if existed {
            self.persist(&entries).await?;
        }
        Ok(existed)
    }
}
