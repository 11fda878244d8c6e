//! Machine deployments generated per pool and zone

use std::collections::BTreeMap;

use cirrus_common::crd::{MachineImage, WorkerPool};
use k8s_openapi::api::core::v1::Taint;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::{Deserialize, Serialize};

use crate::class::MachineClass;

/// Desired machine deployment for one pool, or one zone of a pool
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineDeployment {
    /// Deployment name (`<namespace>-<pool>[-z<zone>]`)
    pub name: String,

    /// Machine class used by the deployment
    pub class_name: String,

    /// Secret holding the class credentials, always equal to `class_name`
    pub secret_name: String,

    /// Minimum number of machines
    pub minimum: i32,

    /// Maximum number of machines
    pub maximum: i32,

    /// Surge budget during rollouts
    pub max_surge: IntOrString,

    /// Unavailability budget during rollouts
    pub max_unavailable: IntOrString,

    /// Node labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Node annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Node taints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
}

impl MachineDeployment {
    /// Deployment carrying the pool's limits and node metadata
    pub(crate) fn for_pool(pool: &WorkerPool, name: String, class_name: String) -> Self {
        Self {
            name,
            secret_name: class_name.clone(),
            class_name,
            minimum: pool.minimum,
            maximum: pool.maximum,
            max_surge: pool.max_surge.clone(),
            max_unavailable: pool.max_unavailable.clone(),
            labels: pool.labels.clone(),
            annotations: pool.annotations.clone(),
            taints: pool.taints.clone(),
        }
    }
}

/// Everything generated for a worker in one pass
///
/// `deployments` and `classes` are index-aligned: entry `i` of each describes
/// the same deployment unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MachineConfig {
    /// Machine deployments in pool order, then zone order
    pub deployments: Vec<MachineDeployment>,

    /// Machine classes, one per deployment
    pub classes: Vec<MachineClass>,

    /// Images used by the pools, without duplicates
    pub images: Vec<MachineImage>,
}

impl MachineConfig {
    /// Record an image unless the same name and version is already present
    pub(crate) fn add_image(&mut self, image: MachineImage) {
        let known = self
            .images
            .iter()
            .any(|i| i.name == image.name && i.version == image.version);
        if !known {
            self.images.push(image);
        }
    }

    /// Append one deployment unit
    pub(crate) fn push(&mut self, deployment: MachineDeployment, class: MachineClass) {
        self.deployments.push(deployment);
        self.classes.push(class);
    }
}
