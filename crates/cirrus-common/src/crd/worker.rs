//! Worker resource: pools to expand and the images they resolved to

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Taint;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Worker resource handed to the machine expansion
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    /// Namespace of the cluster in the seed; prefixes every generated name
    pub namespace: String,

    /// Desired state
    pub spec: WorkerSpec,

    /// State recorded by a previous reconciliation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkerStatus>,
}

/// Desired worker state
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSpec {
    /// Azure region
    pub region: String,

    /// Secret holding the cloud credentials
    pub secret_ref: SecretReference,

    /// Public SSH key installed on every machine
    #[serde(default)]
    pub ssh_public_key: String,

    /// Encoded [`InfrastructureStatus`](super::InfrastructureStatus) from the infrastructure controller
    pub infrastructure_provider_status: serde_json::Value,

    /// Kubernetes version of the cluster, part of every pool fingerprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,

    /// Worker pools in declaration order
    #[serde(default)]
    pub pools: Vec<WorkerPool>,
}

/// Reference to a secret by name and namespace
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct SecretReference {
    /// Secret name
    pub name: String,
    /// Secret namespace
    pub namespace: String,
}

/// A worker pool specification
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPool {
    /// Pool name, unique within the worker
    pub name: String,

    /// Minimum number of machines
    pub minimum: i32,

    /// Maximum number of machines
    pub maximum: i32,

    /// Machines that may be created above the desired count during a rollout
    pub max_surge: IntOrString,

    /// Machines that may be unavailable during a rollout
    pub max_unavailable: IntOrString,

    /// Availability zones, used only for zoned clusters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,

    /// Azure VM size (e.g., "Standard_D4s_v3")
    pub machine_type: String,

    /// OS image
    pub machine_image: MachineImageRef,

    /// OS disk
    pub volume: Volume,

    /// Cloud-init user data
    #[serde(default)]
    pub user_data: String,

    /// Labels for the nodes of this pool
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Annotations for the nodes of this pool
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Taints for the nodes of this pool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
}

/// Machine image requested by name and version
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct MachineImageRef {
    /// Image name (e.g., "ubuntu")
    pub name: String,
    /// Image version
    pub version: String,
}

/// OS disk declaration
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Volume {
    /// Size as a quantity string (e.g., "50Gi")
    pub size: String,

    /// Azure storage account type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

/// Concrete reference to an Azure image
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageReference {
    /// Marketplace URN (`publisher:offer:sku:version`)
    Urn(String),
    /// Resource ID of a custom or shared gallery image
    Id(String),
}

impl ImageReference {
    /// Build from the optional URN/ID pair used in configuration files
    ///
    /// Exactly one of the two must be set.
    pub fn from_parts(urn: Option<&str>, id: Option<&str>) -> Option<Self> {
        match (urn, id) {
            (Some(urn), None) => Some(Self::Urn(urn.to_string())),
            (None, Some(id)) => Some(Self::Id(id.to_string())),
            _ => None,
        }
    }
}

/// A resolved machine image, as recorded in the worker status
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct MachineImage {
    /// Image name
    pub name: String,
    /// Image version
    pub version: String,
    /// Where the image comes from
    #[serde(flatten)]
    pub reference: ImageReference,
}

/// Worker state recorded by a previous reconciliation
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    /// Images referenced by the pools when last reconciled
    #[serde(default)]
    pub machine_images: Vec<MachineImage>,
}
