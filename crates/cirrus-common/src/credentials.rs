//! Azure service principal credentials
//!
//! Credentials are read from the data of the secret referenced by the worker.

use std::collections::BTreeMap;
use std::fmt;

use crate::crd::SecretReference;
use crate::{Error, Result};

/// Secret data key holding the client ID
pub const CLIENT_ID_KEY: &str = "clientID";
/// Secret data key holding the client secret
pub const CLIENT_SECRET_KEY: &str = "clientSecret";
/// Secret data key holding the subscription ID
pub const SUBSCRIPTION_ID_KEY: &str = "subscriptionID";
/// Secret data key holding the tenant ID
pub const TENANT_ID_KEY: &str = "tenantID";

/// Service principal credentials for Azure
#[derive(Clone, PartialEq, Eq)]
pub struct ClientAuth {
    /// Application (client) ID
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Subscription ID
    pub subscription_id: String,
    /// Tenant ID
    pub tenant_id: String,
}

impl ClientAuth {
    /// Read credentials from raw secret data
    ///
    /// All four keys must be present and valid UTF-8.
    pub fn from_secret_data(data: &BTreeMap<String, Vec<u8>>) -> Result<Self> {
        let read = |key: &str| -> Result<String> {
            let value = data
                .get(key)
                .ok_or_else(|| Error::credentials(format!("secret does not contain {key}")))?;
            String::from_utf8(value.clone())
                .map_err(|_| Error::credentials(format!("secret key {key} is not valid UTF-8")))
        };

        Ok(Self {
            client_id: read(CLIENT_ID_KEY)?,
            client_secret: read(CLIENT_SECRET_KEY)?,
            subscription_id: read(SUBSCRIPTION_ID_KEY)?,
            tenant_id: read(TENANT_ID_KEY)?,
        })
    }
}

impl fmt::Debug for ClientAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientAuth")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Source of cloud credentials for a secret reference
pub trait CredentialsProvider: Send + Sync {
    /// Fetch the credentials stored in the referenced secret
    fn client_auth(&self, secret_ref: &SecretReference) -> Result<ClientAuth>;
}

/// Credentials provider backed by an in-memory map of secret data
#[derive(Clone, Debug, Default)]
pub struct SecretDataProvider {
    secrets: BTreeMap<(String, String), BTreeMap<String, Vec<u8>>>,
}

impl SecretDataProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the data of a secret
    pub fn with_secret(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: BTreeMap<String, Vec<u8>>,
    ) -> Self {
        self.secrets.insert((namespace.into(), name.into()), data);
        self
    }
}

impl CredentialsProvider for SecretDataProvider {
    fn client_auth(&self, secret_ref: &SecretReference) -> Result<ClientAuth> {
        let data = self
            .secrets
            .get(&(secret_ref.namespace.clone(), secret_ref.name.clone()))
            .ok_or_else(|| {
                Error::credentials(format!(
                    "secret {}/{} not found",
                    secret_ref.namespace, secret_ref.name
                ))
            })?;
        ClientAuth::from_secret_data(data)
    }
}
