use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use keyring::Entry;
use tracing::debug;

/// Service name under which every termtable secret is filed in the OS keyring
pub const SERVICE_NAME: &str = "termtable-app";

/// Errors shared by the secret store and the metadata store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("entry not found")]
    NotFound,
    #[error("storage I/O failure: {0}")]
    IoFailure(String),
    #[error("secret store unavailable: {0}")]
    Unavailable(String),
    #[error("stored value is corrupt: {0}")]
    Corrupt(String),
}

impl From<keyring::Error> for StoreError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => Self::NotFound,
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Key/value capability over an OS-level secret store.
///
/// Secrets are addressed by `(realm, account)`. Implementations do no retrying;
/// callers decide what to do with a failure.
pub trait SecretStore: Send + Sync {
    fn set_secret(
        &self,
        realm: &str,
        account: &str,
        value: &str,
    ) -> Result<(), StoreError>;

    fn get_secret(&self, realm: &str, account: &str)
    -> Result<String, StoreError>;

    /// Removing a secret that does not exist is not an error.
    fn delete_secret(&self, realm: &str, account: &str)
    -> Result<(), StoreError>;
}

/// Secret store backed by the platform keyring
#[derive(Debug, Default, Clone, Copy)]
pub struct Keyring;

impl Keyring {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn entry(realm: &str, account: &str) -> Result<Entry, StoreError> {
        Ok(Entry::new(realm, account)?)
    }
}

impl SecretStore for Keyring {
    fn set_secret(
        &self,
        realm: &str,
        account: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        debug!(realm, account, "writing secret to keyring");
        Self::entry(realm, account)?.set_password(value)?;
        Ok(())
    }

    fn get_secret(
        &self,
        realm: &str,
        account: &str,
    ) -> Result<String, StoreError> {
        Ok(Self::entry(realm, account)?.get_password()?)
    }

    fn delete_secret(
        &self,
        realm: &str,
        account: &str,
    ) -> Result<(), StoreError> {
        debug!(realm, account, "deleting secret from keyring");
        match Self::entry(realm, account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local secret store, used in tests and when no keyring is reachable
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<(String, String), String>>,
}

impl MemorySecretStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets across all realms
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn set_secret(
        &self,
        realm: &str,
        account: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        self.secrets
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .insert((realm.to_string(), account.to_string()), value.to_string());
        Ok(())
    }

    fn get_secret(
        &self,
        realm: &str,
        account: &str,
    ) -> Result<String, StoreError> {
        self.secrets
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .get(&(realm.to_string(), account.to_string()))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn delete_secret(
        &self,
        realm: &str,
        account: &str,
    ) -> Result<(), StoreError> {
        self.secrets
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .remove(&(realm.to_string(), account.to_string()));
        Ok(())
    }
}
