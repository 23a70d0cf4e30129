use comment_lottery::application::models::platform::Platform;
use comment_lottery::error::CredentialError;
use comment_lottery::presentation::encryption::Encryptor;
use comment_lottery::session::auth::{CapturedLogin, Credential};
use comment_lottery::storage::credential_store::{CredentialStore, FileCredentialStore};
use tempfile::TempDir;

fn credential(platform: Platform) -> Credential {
    Credential::new(
        platform,
        CapturedLogin {
            cookies: "sessionid=s3cr3t; csrftoken=t0k3n".into(),
            user_agent: Some("Mozilla/5.0".into()),
        },
        chrono::Duration::hours(24),
    )
    .unwrap()
}

#[tokio::test]
async fn test_platforms_are_isolated() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::new(dir.path(), Encryptor::from_secret("key").unwrap());

    store.save(&credential(Platform::Threads)).await.unwrap();
    store.save(&credential(Platform::Instagram)).await.unwrap();
    store.clear(Platform::Threads).await.unwrap();

    assert!(store.load(Platform::Threads).await.unwrap().is_none());
    let instagram = store.load(Platform::Instagram).await.unwrap().unwrap();
    assert_eq!(instagram.user_agent.as_deref(), Some("Mozilla/5.0"));
}

#[tokio::test]
async fn test_survives_reopen_with_same_key() {
    let dir = TempDir::new().unwrap();
    let saved = credential(Platform::Instagram);
    FileCredentialStore::new(dir.path(), Encryptor::from_secret("key").unwrap())
        .save(&saved)
        .await
        .unwrap();

    let reopened = FileCredentialStore::new(dir.path(), Encryptor::from_secret("key").unwrap());
    assert_eq!(reopened.load(Platform::Instagram).await.unwrap(), Some(saved));
}

#[tokio::test]
async fn test_file_swapped_between_platforms_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::new(dir.path(), Encryptor::from_secret("key").unwrap());
    store.save(&credential(Platform::Threads)).await.unwrap();
    std::fs::copy(
        dir.path().join("threads.credential"),
        dir.path().join("instagram.credential"),
    )
    .unwrap();

    let result = store.load(Platform::Instagram).await;
    assert!(matches!(
        result,
        Err(CredentialError::Corrupt {
            platform: Platform::Instagram,
            ..
        })
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::new(dir.path(), Encryptor::from_secret("key").unwrap());
    store.save(&credential(Platform::Threads)).await.unwrap();

    let mode = std::fs::metadata(dir.path().join("threads.credential"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
    assert!(!dir.path().join("threads.credential.tmp").exists());
}
