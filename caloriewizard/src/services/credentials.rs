/// Credential Manager Service
/// Keeps the password-protection key in the OS credential store
use crate::config::KEYSTORE_SERVICE_NAME;
use crate::crypto::KeyStore;
use crate::error::{AppError, Result};
use base64::Engine;
use keyring::Entry;

/// Key store backed by the platform credential manager
pub struct KeyringKeyStore {
    service: String,
}

impl KeyringKeyStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, alias: &str) -> Result<Entry> {
        Entry::new(&self.service, alias)
            .map_err(|e| AppError::KeyStore(format!("Failed to create keyring entry: {}", e)))
    }
}

impl Default for KeyringKeyStore {
    fn default() -> Self {
        Self::new(KEYSTORE_SERVICE_NAME)
    }
}

impl KeyStore for KeyringKeyStore {
    fn load_key(&self, alias: &str) -> Result<Option<Vec<u8>>> {
        let encoded = match self.entry(alias)?.get_password() {
            Ok(encoded) => encoded,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => {
                return Err(AppError::KeyStore(format!("Failed to retrieve key: {}", e)));
            }
        };

        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map(Some)
            .map_err(|e| AppError::KeyStore(format!("Stored key is corrupt: {}", e)))
    }

    fn store_key(&self, alias: &str, key: &[u8]) -> Result<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(key);

        self.entry(alias)?
            .set_password(&encoded)
            .map_err(|e| AppError::KeyStore(format!("Failed to store key: {}", e)))?;

        tracing::info!("Key '{}' stored in credential manager", alias);
        Ok(())
    }
}
