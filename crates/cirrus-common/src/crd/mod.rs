//! Azure infrastructure and worker API types
//!
//! - [`InfrastructureConfig`] - user-declared network, identity and NAT intent
//! - [`InfrastructureStatus`] - the resolved view produced by infrastructure provisioning
//! - [`Worker`] / [`WorkerPool`] - pools to expand into machine deployments
//! - [`CloudProfileConfig`] - operator-offered images and accelerated networking support

mod cloud_profile;
mod infrastructure;
mod worker;

pub use cloud_profile::{CloudProfileConfig, MachineImageVersion, MachineImages};
pub use infrastructure::{
    AvailabilitySet, AzResourceReference, IdentityConfig, IdentityStatus, InfrastructureConfig,
    InfrastructureStatus, NatGatewayConfig, NetworkConfig, NetworkStatus, Purpose, ResourceGroup,
    Subnet, VNet, VNetStatus,
};
pub use worker::{
    ImageReference, MachineImage, MachineImageRef, SecretReference, Volume, Worker, WorkerPool,
    WorkerSpec, WorkerStatus,
};

use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Decode a YAML document into an API type
pub fn decode_yaml<T: DeserializeOwned>(kind: &str, input: &str) -> Result<T> {
    serde_yaml::from_str(input).map_err(|e| Error::serialization_for(kind, e.to_string()))
}

/// Decode a JSON value into an API type
pub fn decode_json<T: DeserializeOwned>(kind: &str, value: &serde_json::Value) -> Result<T> {
    T::deserialize(value).map_err(|e| Error::serialization_for(kind, e.to_string()))
}
