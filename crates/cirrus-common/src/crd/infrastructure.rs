//! Infrastructure configuration (user intent) and status (resolved view)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Declared infrastructure for an Azure cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    /// Existing resource group to deploy into (currently not supported)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<ResourceGroup>,

    /// Network layout
    pub networks: NetworkConfig,

    /// Managed identity attached to the worker machines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityConfig>,

    /// Spread workers over availability zones instead of an availability set
    #[serde(default)]
    pub zoned: bool,
}

/// Reference to an Azure resource group
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ResourceGroup {
    /// Resource group name
    pub name: String,
}

/// Network section of the infrastructure config
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Virtual network, either managed (own CIDR) or existing (name + resource group)
    #[serde(default)]
    pub vnet: VNet,

    /// CIDR of the worker subnet
    pub workers: String,

    /// Optional NAT gateway for outbound traffic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_gateway: Option<NatGatewayConfig>,
}

/// Virtual network declaration
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VNet {
    /// Name of an existing vnet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Resource group of an existing vnet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,

    /// CIDR of a managed vnet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

impl VNet {
    /// Whether this refers to a pre-existing vnet in another resource group
    pub fn is_existing(&self) -> bool {
        self.name.is_some() && self.resource_group.is_some()
    }
}

/// NAT gateway settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NatGatewayConfig {
    /// Whether the NAT gateway is provisioned
    #[serde(default)]
    pub enabled: bool,

    /// Public IP addresses to attach
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<AzResourceReference>,

    /// Public IP prefixes to attach
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_address_ranges: Vec<AzResourceReference>,
}

impl NatGatewayConfig {
    /// Whether any IP address or range is listed
    pub fn has_ip_references(&self) -> bool {
        !self.ip_addresses.is_empty() || !self.ip_address_ranges.is_empty()
    }
}

/// Reference to an Azure resource by name and resource group
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AzResourceReference {
    /// Resource name
    #[serde(default)]
    pub name: String,

    /// Resource group hosting the resource
    #[serde(default)]
    pub resource_group: String,
}

/// Managed identity reference
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityConfig {
    /// Identity name
    #[serde(default)]
    pub name: String,

    /// Resource group hosting the identity
    #[serde(default)]
    pub resource_group: String,
}

/// Purpose tag of subnets and availability sets
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Hosts the worker nodes
    Nodes,
    /// Internal use by the infrastructure controller
    Internal,
    /// Any purpose this version does not know about
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nodes => write!(f, "nodes"),
            Self::Internal => write!(f, "internal"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Infrastructure as provisioned by the infrastructure controller
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureStatus {
    /// Provisioned networks
    pub networks: NetworkStatus,

    /// Resource group everything lives in
    pub resource_group: ResourceGroup,

    /// Availability sets, used only when not zoned
    #[serde(default)]
    pub availability_sets: Vec<AvailabilitySet>,

    /// Whether the cluster is zoned
    #[serde(default)]
    pub zoned: bool,

    /// Resolved managed identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityStatus>,
}

impl InfrastructureStatus {
    /// Find the availability set tagged with `purpose`
    pub fn find_availability_set_by_purpose(&self, purpose: Purpose) -> Result<&AvailabilitySet> {
        self.availability_sets
            .iter()
            .find(|set| set.purpose == purpose)
            .ok_or_else(|| Error::not_found("availability set", purpose.to_string()))
    }
}

/// Provisioned network view
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    /// The vnet the subnets belong to
    pub vnet: VNetStatus,

    /// Subnets tagged by purpose
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

impl NetworkStatus {
    /// Find the subnet tagged with `purpose`
    pub fn find_subnet_by_purpose(&self, purpose: Purpose) -> Result<&Subnet> {
        self.subnets
            .iter()
            .find(|subnet| subnet.purpose == purpose)
            .ok_or_else(|| Error::not_found("subnet", purpose.to_string()))
    }
}

/// Provisioned vnet
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VNetStatus {
    /// Vnet name
    pub name: String,

    /// Resource group of an existing vnet living outside the cluster resource group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
}

/// Provisioned subnet
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Subnet {
    /// Subnet name
    pub name: String,
    /// What the subnet is used for
    pub purpose: Purpose,
}

/// Provisioned availability set
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySet {
    /// Availability set name
    pub name: String,
    /// Azure resource ID
    pub id: String,
    /// What the availability set is used for
    pub purpose: Purpose,
}

/// Resolved managed identity
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityStatus {
    /// Azure resource ID of the identity
    pub id: String,
    /// Client ID of the identity
    #[serde(default)]
    pub client_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_yaml() -> &'static str {
        r#"
networks:
  vnet:
    name: vnet-1
    resourceGroup: network-rg
  subnets:
    - name: internal-subnet
      purpose: internal
    - name: nodes-subnet
      purpose: nodes
resourceGroup:
  name: shoot--foo--bar
availabilitySets:
  - name: avset
    id: /subscriptions/sub/avset
    purpose: nodes
identity:
  id: /subscriptions/sub/identity
  clientId: client
"#
    }

    #[test]
    fn decodes_status_from_yaml() {
        let status: InfrastructureStatus =
            serde_yaml::from_str(status_yaml()).expect("status should decode");
        assert_eq!(status.networks.vnet.resource_group.as_deref(), Some("network-rg"));
        assert!(!status.zoned);
        assert_eq!(
            status.identity.as_ref().map(|i| i.id.as_str()),
            Some("/subscriptions/sub/identity")
        );
    }

    #[test]
    fn finds_subnet_by_purpose() {
        let status: InfrastructureStatus =
            serde_yaml::from_str(status_yaml()).expect("status should decode");
        let subnet = status
            .networks
            .find_subnet_by_purpose(Purpose::Nodes)
            .expect("nodes subnet should exist");
        assert_eq!(subnet.name, "nodes-subnet");
    }

    #[test]
    fn missing_availability_set_is_not_found() {
        let status = InfrastructureStatus::default();
        let err = status
            .find_availability_set_by_purpose(Purpose::Nodes)
            .expect_err("empty status has no availability set");
        assert!(matches!(err, Error::NotFound { ref kind, .. } if kind == "availability set"));
    }

    #[test]
    fn unknown_purposes_decode() {
        let subnet: Subnet = serde_yaml::from_str("name: x\npurpose: bastion\n")
            .expect("unknown purpose should decode");
        assert_eq!(subnet.purpose, Purpose::Unknown);
    }

    #[test]
    fn config_omits_unset_fields() {
        let config = InfrastructureConfig {
            networks: NetworkConfig {
                workers: "10.250.0.0/19".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&config).expect("config should serialize");
        assert!(yaml.contains("workers: 10.250.0.0/19"));
        assert!(!yaml.contains("resourceGroup"));
        assert!(!yaml.contains("natGateway"));
    }

    #[test]
    fn existing_vnet_requires_name_and_group() {
        let mut vnet = VNet {
            name: Some("vnet".to_string()),
            ..Default::default()
        };
        assert!(!vnet.is_existing());
        vnet.resource_group = Some("rg".to_string());
        assert!(vnet.is_existing());
    }
}
