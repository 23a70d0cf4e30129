/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 14/10/26
 ******************************************************************************/
use crate::application::models::platform::Platform;
use crate::error::CredentialError;
use crate::presentation::encryption::Cipher;
use crate::presentation::serialization::Serializer;
use crate::session::auth::Credential;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Encrypted-at-rest persistence of one credential per platform.
///
/// Expiry is not judged here; a stored credential is returned as long as it
/// decrypts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when nothing is stored, `Err(Corrupt)` when the blob is unreadable.
    async fn load(&self, platform: Platform) -> Result<Option<Credential>, CredentialError>;
    /// Replaces any credential already stored for the platform.
    async fn save(&self, credential: &Credential) -> Result<(), CredentialError>;
    async fn clear(&self, platform: Platform) -> Result<(), CredentialError>;
}

/// One encrypted file per platform under a directory.
///
/// Access is serialized per platform: loads share the lock, saves and clears
/// take it exclusively, and saves land through a rename so a reader never
/// sees a half-written file.
pub struct FileCredentialStore<C: Cipher> {
    dir: PathBuf,
    cipher: C,
    locks: HashMap<Platform, RwLock<()>>,
}

impl<C: Cipher> FileCredentialStore<C> {
    pub fn new(dir: impl Into<PathBuf>, cipher: C) -> Self {
        let locks = Platform::all()
            .iter()
            .map(|p| (*p, RwLock::new(())))
            .collect();
        Self {
            dir: dir.into(),
            cipher,
            locks,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, platform: Platform) -> PathBuf {
        self.dir.join(format!("{}.credential", platform))
    }

    fn lock_for(&self, platform: Platform) -> &RwLock<()> {
        // every platform gets a lock in `new`
        &self.locks[&platform]
    }

    fn corrupt(platform: Platform, reason: impl ToString) -> CredentialError {
        CredentialError::Corrupt {
            platform,
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl<C: Cipher> CredentialStore for FileCredentialStore<C> {
    #[instrument(skip(self))]
    async fn load(&self, platform: Platform) -> Result<Option<Credential>, CredentialError> {
        let _guard = self.lock_for(platform).read().await;
        let path = self.path_for(platform);

        let sealed = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No credential stored for {}", platform);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let json = self
            .cipher
            .decrypt(&sealed)
            .map_err(|e| Self::corrupt(platform, e))?;
        let credential: Credential =
            Serializer::from_json(&json).map_err(|e| Self::corrupt(platform, e))?;
        if credential.platform != platform {
            return Err(Self::corrupt(
                platform,
                format!("stored for {}", credential.platform),
            ));
        }

        debug!("Loaded credential for {}", platform);
        Ok(Some(credential))
    }

    #[instrument(skip(self, credential), fields(platform = %credential.platform))]
    async fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        let platform = credential.platform;
        let json = Serializer::to_json(credential)
            .map_err(|e| CredentialError::Encryption(e.to_string()))?;
        let sealed = self
            .cipher
            .encrypt(&json)
            .map_err(|e| CredentialError::Encryption(e.to_string()))?;

        let _guard = self.lock_for(platform).write().await;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(platform);
        let staging = path.with_extension("credential.tmp");
        let mut staged = StagedFile::new(&staging);
        tokio::fs::write(&staging, sealed.as_bytes()).await?;
        restrict_permissions(&staging).await?;
        tokio::fs::rename(&staging, &path).await?;
        staged.commit();

        info!("Saved credential for {}", platform);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear(&self, platform: Platform) -> Result<(), CredentialError> {
        let _guard = self.lock_for(platform).write().await;
        match tokio::fs::remove_file(self.path_for(platform)).await {
            Ok(()) => {
                info!("Cleared stored credential for {}", platform);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Failed to clear credential for {}: {}", platform, e);
                Err(e.into())
            }
        }
    }
}

/// Deletes a staging file on drop unless it was renamed into place, so a
/// failed or cancelled save leaves nothing behind.
struct StagedFile<'a> {
    path: &'a Path,
    committed: bool,
}

impl<'a> StagedFile<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(&mut self) {
        self.committed = true;
    }
}

impl Drop for StagedFile<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(self.path) {
            Ok(()) => debug!("Removed staging file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove staging file {}: {}", self.path.display(), e),
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

/// Process-local store for deployments without a configured encryption key.
///
/// Nothing reaches disk, so credentials live only as long as the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<Platform, Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self, platform: Platform) -> Result<Option<Credential>, CredentialError> {
        Ok(self.entries.read().await.get(&platform).cloned())
    }

    async fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        self.entries
            .write()
            .await
            .insert(credential.platform, credential.clone());
        Ok(())
    }

    async fn clear(&self, platform: Platform) -> Result<(), CredentialError> {
        self.entries.write().await.remove(&platform);
        Ok(())
    }
}
