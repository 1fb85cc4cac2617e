use termtable_auth::{SecretStore, StoreError};
use tracing::{info, warn};

use crate::{ConnectionProfile, metadata::MetadataStore};

/// Realm under which connection credentials are filed in the secret store
pub const SECRET_REALM: &str = termtable_auth::SERVICE_NAME;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no stored credentials for connection '{0}'")]
    CredentialsMissing(String),
    #[error("stored data for connection '{0}' is corrupt")]
    Corrupt(String),
    #[error("invalid connection profile: {0}")]
    InvalidProfile(String),
    #[error(transparent)]
    Underlying(#[from] StoreError),
}

/// The `user`/`pass` pair kept in the secret store, encoded as a two element
/// JSON array so neither value can collide with a separator.
struct SecretRecord {
    user: String,
    pass: String,
}

impl SecretRecord {
    const FIELD_COUNT: usize = 2;

    fn encode(&self) -> String {
        serde_json::json!([self.user, self.pass]).to_string()
    }

    fn decode(value: &str) -> Option<Self> {
        let fields: Vec<String> = serde_json::from_str(value).ok()?;
        let [user, pass]: [String; Self::FIELD_COUNT] = fields.try_into().ok()?;
        Some(Self { user, pass })
    }
}

/// Joins the metadata store and the secret store into connection profiles.
///
/// Neither store refers to the other; both are keyed by the profile name and
/// the join is recomputed on every read.
pub struct ConnectionRegistry {
    metadata: MetadataStore,
    secrets: Box<dyn SecretStore>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new(metadata: MetadataStore, secrets: Box<dyn SecretStore>) -> Self {
        Self { metadata, secrets }
    }

    /// Persist `profile`: credentials first, then metadata.
    ///
    /// Saving is idempotent. If the secret write succeeds and the metadata
    /// write fails, an orphaned secret is left behind and the error is
    /// returned as [`RegistryError::Underlying`]; retry `save` or call
    /// [`ConnectionRegistry::delete`] to clean up.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidProfile`] for a blank name, otherwise the
    /// failing store's error.
    pub fn save(&self, profile: &ConnectionProfile) -> Result<(), RegistryError> {
        if profile.name.trim().is_empty() {
            return Err(RegistryError::InvalidProfile(
                "connection name must not be empty".to_string(),
            ));
        }

        let secret = SecretRecord {
            user: profile.user.clone(),
            pass: profile.pass.clone(),
        };
        self.secrets
            .set_secret(SECRET_REALM, &profile.name, &secret.encode())?;

        if let Err(e) = self.metadata.put(&profile.name, &profile.metadata()) {
            warn!(
                name = %profile.name,
                error = %e,
                "metadata write failed after secret was stored"
            );
            return Err(e.into());
        }

        info!(name = %profile.name, "saved connection");
        Ok(())
    }

    /// All stored profiles in name order, without credentials and with
    /// status `Unknown`. Corrupt metadata records are skipped.
    ///
    /// # Errors
    ///
    /// Returns the metadata store's error if it cannot be read.
    pub fn list(&self) -> Result<Vec<ConnectionProfile>, RegistryError> {
        Ok(self
            .metadata
            .list_all()?
            .into_iter()
            .map(|(name, record)| ConnectionProfile::from_metadata(name, record))
            .collect())
    }

    /// A single profile without credentials.
    ///
    /// # Errors
    ///
    /// `Underlying(NotFound)` for an unknown name, `Corrupt` if the stored
    /// metadata does not decode.
    pub fn get(&self, name: &str) -> Result<ConnectionProfile, RegistryError> {
        match self.metadata.get(name) {
            Ok(record) => {
                Ok(ConnectionProfile::from_metadata(name.to_string(), record))
            }
            Err(StoreError::Corrupt(_)) => {
                Err(RegistryError::Corrupt(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read the `(user, pass)` pair stored for `name`.
    ///
    /// # Errors
    ///
    /// `CredentialsMissing` when the secret store has no entry, `Corrupt` when
    /// the entry is not a two element record, `Underlying` for store failures.
    pub fn resolve_credentials(
        &self,
        name: &str,
    ) -> Result<(String, String), RegistryError> {
        let value = match self.secrets.get_secret(SECRET_REALM, name) {
            Ok(value) => value,
            Err(StoreError::NotFound) => {
                return Err(RegistryError::CredentialsMissing(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let record = SecretRecord::decode(&value).ok_or_else(|| {
            warn!(name, "stored credentials do not decode");
            RegistryError::Corrupt(name.to_string())
        })?;
        Ok((record.user, record.pass))
    }

    /// A complete profile: metadata joined with resolved credentials.
    ///
    /// # Errors
    ///
    /// Any error from [`ConnectionRegistry::get`] or
    /// [`ConnectionRegistry::resolve_credentials`].
    pub fn open(&self, name: &str) -> Result<ConnectionProfile, RegistryError> {
        let profile = self.get(name)?;
        let (user, pass) = self.resolve_credentials(name)?;
        Ok(profile.with_credentials(user, pass))
    }

    /// Remove `name` from both stores.
    ///
    /// Both deletes are attempted even if one fails; a missing entry in either
    /// store is not an error. The first real failure is returned.
    ///
    /// # Errors
    ///
    /// The first store error other than `NotFound`.
    pub fn delete(&self, name: &str) -> Result<(), RegistryError> {
        let secret = match self.secrets.delete_secret(SECRET_REALM, name) {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e),
        };
        let metadata = match self.metadata.delete(name) {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e),
        };

        secret.and(metadata)?;
        info!(name, "deleted connection");
        Ok(())
    }
}
