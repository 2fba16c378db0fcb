//! Cryptography module for password protection
//!
//! Provides AES-256-GCM encryption under a key that lives in a key store.
//! Output layout is `iv (12 bytes) || ciphertext || tag (16 bytes)`, stored
//! in the password column as standard base64.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::Engine;
use crate::config::{IV_SIZE, KEY_SIZE, TAG_SIZE};
use crate::error::{AppError, Result};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Storage for named symmetric keys
pub trait KeyStore: Send + Sync {
    /// Fetch the key stored under `alias`, if any
    fn load_key(&self, alias: &str) -> Result<Option<Vec<u8>>>;

    /// Store `key` under `alias`, replacing any previous key
    fn store_key(&self, alias: &str, key: &[u8]) -> Result<()>;
}

/// Process-local key store for tests and hosts without an OS store
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn load_key(&self, alias: &str) -> Result<Option<Vec<u8>>> {
        let keys = self
            .keys
            .lock()
            .map_err(|e| AppError::KeyStore(format!("Key store poisoned: {}", e)))?;
        Ok(keys.get(alias).cloned())
    }

    fn store_key(&self, alias: &str, key: &[u8]) -> Result<()> {
        let mut keys = self
            .keys
            .lock()
            .map_err(|e| AppError::KeyStore(format!("Key store poisoned: {}", e)))?;
        keys.insert(alias.to_string(), key.to_vec());
        Ok(())
    }
}

/// Encrypts and decrypts account passwords with a stored key
#[derive(Clone)]
pub struct PasswordCipher {
    store: Arc<dyn KeyStore>,
    alias: String,
}

impl PasswordCipher {
    pub fn new(store: Arc<dyn KeyStore>, alias: impl Into<String>) -> Self {
        Self {
            store,
            alias: alias.into(),
        }
    }

    /// Generate the key if the store does not hold one yet
    pub fn initialize(&self) -> Result<()> {
        if self.store.load_key(&self.alias)?.is_some() {
            return Ok(());
        }

        let mut key = vec![0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        self.store.store_key(&self.alias, &key)?;

        tracing::info!("Generated password key '{}'", self.alias);
        Ok(())
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        let key = self
            .store
            .load_key(&self.alias)?
            .ok_or_else(|| AppError::Crypto(format!("Key '{}' is not available", self.alias)))?;

        Aes256Gcm::new_from_slice(&key)
            .map_err(|e| AppError::Crypto(format!("Cipher initialization failed: {}", e)))
    }

    /// Encrypt with a fresh random IV; returns `iv || ciphertext`
    pub fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>> {
        let cipher = self.cipher()?;

        let mut iv = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|e| AppError::Crypto(format!("Encryption failed: {}", e)))?;

        let mut blob = Vec::with_capacity(IV_SIZE + ciphertext.len());
        blob.extend_from_slice(&iv);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Authenticate and decrypt an `iv || ciphertext` blob
    pub fn decrypt(&self, blob: &[u8]) -> Result<String> {
        if blob.len() < IV_SIZE + TAG_SIZE {
            return Err(AppError::Crypto(format!(
                "Ciphertext too short: {} bytes",
                blob.len()
            )));
        }

        let cipher = self.cipher()?;
        let (iv, ciphertext) = blob.split_at(IV_SIZE);

        let plaintext = cipher
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|e| AppError::Crypto(format!("Decryption failed: {}", e)))?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::Crypto(format!("Decrypted data is not UTF-8: {}", e)))
    }

    /// Encrypt into the base64 text stored in the password column
    pub fn encrypt_to_base64(&self, plaintext: &str) -> Result<String> {
        let blob = self.encrypt(plaintext)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(blob))
    }

    /// Decrypt the base64 text stored in the password column
    pub fn decrypt_from_base64(&self, encoded: &str) -> Result<String> {
        let blob = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::Crypto(format!("Invalid base64: {}", e)))?;
        self.decrypt(&blob)
    }
}
