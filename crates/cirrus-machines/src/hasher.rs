//! Pool fingerprints used to name machine classes
//!
//! A new fingerprint means a new machine class, which rolls every machine of
//! the pool. Only fields that require new machines take part: scaling limits,
//! labels and taints do not. Zones are left out as well since every class
//! name already carries its zone suffix.

use cirrus_common::crd::WorkerPool;
use cirrus_common::hash::sha256_hex;
use cirrus_common::{Error, Result};

/// Length of the hex fingerprint appended to class names
pub const POOL_HASH_LENGTH: usize = 5;

/// Computes a stable content fingerprint of a worker pool
#[cfg_attr(test, mockall::automock)]
pub trait PoolHasher: Send + Sync {
    /// Fingerprint of `pool`, mixed with the given salt values
    fn hash(&self, pool: &WorkerPool, salt: &[String]) -> Result<String>;
}

/// SHA-256 fingerprint over the machine-relevant pool fields
#[derive(Clone, Debug, Default)]
pub struct Sha256PoolHasher {
    kubernetes_version: Option<String>,
}

impl Sha256PoolHasher {
    /// Create a hasher that also covers the cluster's Kubernetes version
    pub fn new(kubernetes_version: Option<String>) -> Self {
        Self { kubernetes_version }
    }
}

impl PoolHasher for Sha256PoolHasher {
    fn hash(&self, pool: &WorkerPool, salt: &[String]) -> Result<String> {
        let mut fields = vec![
            pool.name.as_str(),
            pool.machine_type.as_str(),
            pool.machine_image.name.as_str(),
            pool.machine_image.version.as_str(),
            pool.volume.size.as_str(),
            pool.volume.type_.as_deref().unwrap_or_default(),
            self.kubernetes_version.as_deref().unwrap_or_default(),
        ];
        fields.extend(salt.iter().map(String::as_str));

        // JSON keeps field boundaries unambiguous
        let canonical = serde_json::to_vec(&fields)
            .map_err(|e| Error::serialization_for("WorkerPool", e.to_string()))?;

        let mut digest = sha256_hex(&canonical);
        digest.truncate(POOL_HASH_LENGTH);
        Ok(digest)
    }
}
