//! Azure machine class specification
//!
//! A [`MachineClass`] is the typed form of what the machine class chart
//! renders. Provider-specific keys this crate does not model can still be
//! carried in [`MachineClass::extra`].

use std::collections::BTreeMap;
use std::fmt;

use cirrus_common::credentials::ClientAuth;
use cirrus_common::crd::ImageReference;
use cirrus_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::constants::MACHINE_CLASSES_VALUES_KEY;

/// One machine class, shared by all machines of a deployment
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineClass {
    /// Class name; also the name of the deployment's secret
    pub name: String,

    /// Labels of the class resource
    pub labels: BTreeMap<String, String>,

    /// Azure region
    pub region: String,

    /// Resource group the machines are created in
    pub resource_group: String,

    /// Tags attached to every VM
    pub tags: BTreeMap<String, String>,

    /// Credentials and user data
    pub secret: MachineClassSecret,

    /// Azure VM size
    pub machine_type: String,

    /// OS image
    pub image: ImageReference,

    /// OS disk
    pub os_disk: OsDisk,

    /// Public SSH key
    pub ssh_public_key: String,

    /// Network attachment
    pub network: NetworkReference,

    /// Resource group of an existing vnet outside the cluster resource group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnet_resource_group: Option<String>,

    /// Availability zone, for zoned clusters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    /// Availability set ID, for unzoned clusters
    #[serde(
        default,
        rename = "availabilitySetID",
        skip_serializing_if = "Option::is_none"
    )]
    pub availability_set_id: Option<String>,

    /// Managed identity attached to the VMs
    #[serde(default, rename = "identityID", skip_serializing_if = "Option::is_none")]
    pub identity_id: Option<String>,

    /// Additional provider-specific keys
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Secret payload of a machine class
#[derive(Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct MachineClassSecret {
    /// Cloud-init user data
    #[serde(rename = "cloudConfig")]
    pub cloud_config: String,
    /// Service principal client ID
    #[serde(rename = "clientID")]
    pub client_id: String,
    /// Service principal secret
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    /// Subscription ID
    #[serde(rename = "subscriptionID")]
    pub subscription_id: String,
    /// Tenant ID
    #[serde(rename = "tenantID")]
    pub tenant_id: String,
}

impl MachineClassSecret {
    /// Combine pool user data with service principal credentials
    pub fn new(cloud_config: impl Into<String>, auth: &ClientAuth) -> Self {
        Self {
            cloud_config: cloud_config.into(),
            client_id: auth.client_id.clone(),
            client_secret: auth.client_secret.clone(),
            subscription_id: auth.subscription_id.clone(),
            tenant_id: auth.tenant_id.clone(),
        }
    }
}

impl fmt::Debug for MachineClassSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineClassSecret")
            .field("cloud_config", &format_args!("<{} bytes>", self.cloud_config.len()))
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// OS disk of a machine class
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct OsDisk {
    /// Size in GB
    pub size: i32,
    /// Storage account type, only set for known types
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

/// Network attachment of a machine class
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkReference {
    /// Vnet name
    pub vnet: String,
    /// Subnet name
    pub subnet: String,
    /// Enable accelerated networking on the NIC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerated_networking: Option<bool>,
}

/// Chart values for a list of machine classes
pub fn machine_class_values(classes: &[MachineClass]) -> Result<serde_json::Value> {
    let classes = serde_json::to_value(classes)
        .map_err(|e| Error::serialization_for("MachineClass", e.to_string()))?;
    Ok(serde_json::json!({ MACHINE_CLASSES_VALUES_KEY: classes }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> ClientAuth {
        ClientAuth {
            client_id: "client".to_string(),
            client_secret: "s3cret".to_string(),
            subscription_id: "sub".to_string(),
            tenant_id: "tenant".to_string(),
        }
    }

    fn class() -> MachineClass {
        MachineClass {
            name: "shoot--dev--a-cpu-worker-abcde".to_string(),
            labels: BTreeMap::from([(
                "gardener.cloud/purpose".to_string(),
                "machineclass".to_string(),
            )]),
            region: "westeurope".to_string(),
            resource_group: "shoot--dev--a".to_string(),
            tags: BTreeMap::new(),
            secret: MachineClassSecret::new("#cloud-config", &auth()),
            machine_type: "Standard_D4s_v3".to_string(),
            image: ImageReference::Urn("Canonical:UbuntuServer:18.04-LTS:latest".to_string()),
            os_disk: OsDisk {
                size: 50,
                type_: None,
            },
            ssh_public_key: "ssh-rsa AAAA".to_string(),
            network: NetworkReference {
                vnet: "vnet".to_string(),
                subnet: "nodes".to_string(),
                accelerated_networking: None,
            },
            vnet_resource_group: None,
            zone: None,
            availability_set_id: Some("/availabilitySets/nodes".to_string()),
            identity_id: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn serializes_with_machine_controller_keys() {
        let json = serde_json::to_value(class()).expect("class should serialize");

        assert_eq!(json["availabilitySetID"], "/availabilitySets/nodes");
        assert_eq!(json["image"]["urn"], "Canonical:UbuntuServer:18.04-LTS:latest");
        assert_eq!(json["osDisk"], serde_json::json!({ "size": 50 }));
        assert_eq!(json["secret"]["clientID"], "client");
        assert_eq!(json["secret"]["cloudConfig"], "#cloud-config");
        assert_eq!(json["network"], serde_json::json!({ "vnet": "vnet", "subnet": "nodes" }));
        assert!(json.get("zone").is_none());
        assert!(json.get("identityID").is_none());
    }

    #[test]
    fn extra_keys_are_flattened() {
        let mut class = class();
        class
            .extra
            .insert("diagnostics".to_string(), serde_json::json!({ "enabled": true }));
        let json = serde_json::to_value(class).expect("class should serialize");
        assert_eq!(json["diagnostics"]["enabled"], true);
    }

    #[test]
    fn debug_output_hides_the_client_secret() {
        let rendered = format!("{:?}", class().secret);
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("#cloud-config"));
        assert!(rendered.contains("client"));
    }

    #[test]
    fn chart_values_wrap_the_class_list() {
        let values = machine_class_values(&[class()]).expect("values should serialize");
        let classes = values["machineClasses"]
            .as_array()
            .expect("machineClasses should be a list");
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0]["name"], "shoot--dev--a-cpu-worker-abcde");
    }
}
