use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

const NONCE_LENGTH: usize = 12;
const KEY_LENGTH: usize = 32;

/// Symmetric primitive the credential store seals blobs with.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String>;
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// AES-256-GCM with a random nonce prepended to every ciphertext.
pub struct Encryptor {
    cipher: Aes256Gcm,
}

impl Encryptor {
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != KEY_LENGTH {
            anyhow::bail!("Encryption key must be {} bytes, got {}", KEY_LENGTH, key.len());
        }
        let key = Key::<Aes256Gcm>::from_slice(key);
        let cipher = Aes256Gcm::new(key);
        Ok(Self { cipher })
    }

    /// Derives the 256-bit key from a configured secret of any length.
    pub fn from_secret(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("Encryption secret is empty");
        }
        let digest = Sha256::digest(secret.as_bytes());
        Self::new(digest.as_slice())
    }
}

impl Cipher for Encryptor {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce);
        let nonce = Nonce::from_slice(&nonce);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| anyhow::anyhow!("Encryption failed: {:?}", e))?;

        let mut result = nonce.to_vec();
        result.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(&result))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let ciphertext = general_purpose::STANDARD
            .decode(ciphertext.trim())
            .context("Failed to decode base64")?;
        if ciphertext.len() < NONCE_LENGTH {
            anyhow::bail!("Ciphertext is too short");
        }

        let (nonce, ciphertext) = ciphertext.split_at(NONCE_LENGTH);
        let nonce = Nonce::from_slice(nonce);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| anyhow::anyhow!("Decryption failed: {:?}", e))?;

        String::from_utf8(plaintext).context("Failed to convert decrypted data to UTF-8")
    }
}
