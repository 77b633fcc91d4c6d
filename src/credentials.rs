//! Credential lookup abstraction.
//!
//! Sources and providers declare which keys they need; the configuration maps
//! those keys to environment variable names. The store is the only place that
//! touches the process environment.

use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::SecretString;

/// A read-only key-value lookup for credentials.
///
/// The interface is intentionally simple - just get by key name.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieve a credential by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    /// Returns `Err` if there was an error accessing the backend.
    async fn get(&self, key: &str) -> Result<Option<SecretString>>;
}

/// Credential store backed by process environment variables.
///
/// An unset or empty variable reads as absent.
#[derive(Debug, Default)]
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialStore for EnvCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>> {
        match std::env::var(key) {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(SecretString::from(value))),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read environment variable {key}"))
            }
        }
    }
}

/// Fetch a required credential, with an error naming the missing key.
pub async fn get_required_secret(
    store: &dyn CredentialStore,
    key: &str,
) -> Result<SecretString> {
    store
        .get(key)
        .await?
        .with_context(|| format!("Missing credential {key} (set the environment variable)"))
}
