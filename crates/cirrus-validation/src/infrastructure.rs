//! Validation of [`InfrastructureConfig`] on create and update
//!
//! Every check runs regardless of earlier failures; the returned list is in
//! check order.

use cirrus_common::crd::{
    AzResourceReference, IdentityConfig, InfrastructureConfig, NatGatewayConfig, ResourceGroup,
    VNet,
};
use cirrus_common::field::{FieldError, FieldErrorList, FieldPath};
use tracing::debug;

use crate::cidr::Cidr;

/// Validate a new infrastructure config against the cluster's CIDRs
///
/// `nodes_cidr`, `pods_cidr` and `services_cidr` come from the cluster
/// networking section and are optional. An empty result means the config is
/// acceptable.
pub fn validate_infrastructure_config(
    config: &InfrastructureConfig,
    nodes_cidr: Option<&str>,
    pods_cidr: Option<&str>,
    services_cidr: Option<&str>,
    path: &FieldPath,
) -> FieldErrorList {
    let mut errors = FieldErrorList::new();

    let nodes = nodes_cidr.map(|c| Cidr::new(c, FieldPath::root()));
    let pods = pods_cidr.map(|c| Cidr::new(c, FieldPath::root()));
    let services = services_cidr.map(|c| Cidr::new(c, FieldPath::root()));

    // Deploying into an existing resource group is implemented downstream but
    // kept disabled until self-created resources are cleaned up on deletion.
    if config.resource_group.is_some() {
        errors.push(FieldError::invalid(
            &path.child("resourceGroup"),
            None,
            "specifying an existing resource group is not supported yet",
        ));
    }

    let networks_path = path.child("networks");
    let vnet_path = networks_path.child("vnet");
    errors.extend(validate_vnet(
        &config.networks.vnet,
        config.resource_group.as_ref(),
        &vnet_path,
    ));

    let workers_path = networks_path.child("workers");
    let workers = Cidr::new(&config.networks.workers, workers_path);
    errors.extend(workers.validate_parse());
    errors.extend(workers.validate_canonical());

    if let Some(nodes) = &nodes {
        errors.extend(nodes.validate_subset(&[&workers]));
    }

    if let Some(vnet_cidr) = &config.networks.vnet.cidr {
        let vnet = Cidr::new(vnet_cidr, vnet_path.child("cidr"));
        errors.extend(vnet.validate_subset(&[&workers]));

        let outside: Vec<&Cidr> = pods.iter().chain(services.iter()).collect();
        errors.extend(vnet.validate_not_subset(&outside));
    }

    if let Some(identity) = &config.identity {
        errors.extend(validate_identity(identity, &path.child("identity")));
    }

    if let Some(nat_gateway) = &config.networks.nat_gateway {
        errors.extend(validate_nat_gateway(
            nat_gateway,
            config.zoned,
            &networks_path.child("natGateway"),
        ));
    }

    debug!(errors = errors.len(), "validated infrastructure config");
    errors
}

/// Validate the changes between an existing and an updated infrastructure config
///
/// The resource group and vnet sections are immutable, and a zoned cluster
/// cannot become unzoned.
pub fn validate_infrastructure_config_update(
    old: &InfrastructureConfig,
    new: &InfrastructureConfig,
    path: &FieldPath,
) -> FieldErrorList {
    let mut errors = FieldErrorList::new();

    if old.resource_group != new.resource_group {
        errors.push(FieldError::invalid(
            &path.child("resourceGroup"),
            new.resource_group.as_ref().map(|rg| rg.name.as_str()),
            "field is immutable",
        ));
    }

    if old.networks.vnet != new.networks.vnet {
        errors.push(FieldError::invalid(
            &path.child("networks").child("vnet"),
            None,
            "field is immutable",
        ));
    }

    if old.zoned && !new.zoned {
        errors.push(FieldError::forbidden(
            &path.child("zoned"),
            "moving a zoned cluster to a non-zoned cluster is not allowed",
        ));
    }

    debug!(errors = errors.len(), "validated infrastructure config update");
    errors
}

fn validate_vnet(
    vnet: &VNet,
    resource_group: Option<&ResourceGroup>,
    path: &FieldPath,
) -> FieldErrorList {
    if vnet.is_existing() {
        let mut errors = FieldErrorList::new();
        if vnet.cidr.is_some() {
            errors.push(FieldError::invalid(
                &path.child("cidr"),
                vnet.cidr.as_deref(),
                "specifying a cidr for an existing vnet is not possible",
            ));
        }
        let vnet_group = vnet.resource_group.as_deref();
        if resource_group.is_some_and(|rg| Some(rg.name.as_str()) == vnet_group) {
            errors.push(FieldError::invalid(
                &path.child("resourceGroup"),
                vnet_group,
                "the vnet resource group must not be the same as the cluster resource group",
            ));
        }
        return errors;
    }

    if vnet.name.is_some() || vnet.resource_group.is_some() {
        return vec![FieldError::invalid(
            path,
            None,
            "specifying an existing vnet name require a vnet name and vnet resource group",
        )];
    }

    // Without a cidr the workers range is used as vnet range downstream
    match &vnet.cidr {
        Some(raw) => {
            let cidr = Cidr::new(raw, path.child("cidr"));
            let mut errors = cidr.validate_parse();
            errors.extend(cidr.validate_canonical());
            errors
        }
        None => Vec::new(),
    }
}

fn validate_identity(identity: &IdentityConfig, path: &FieldPath) -> FieldErrorList {
    if identity.name.is_empty() || identity.resource_group.is_empty() {
        return vec![FieldError::invalid(
            path,
            None,
            "specifying an identity requires the name of the identity and the resource group which hosts the identity",
        )];
    }
    Vec::new()
}

fn validate_nat_gateway(
    nat_gateway: &NatGatewayConfig,
    zoned: bool,
    path: &FieldPath,
) -> FieldErrorList {
    let mut errors = FieldErrorList::new();

    if !zoned {
        errors.push(FieldError::invalid(
            path,
            None,
            "NatGateway is currently only supported for zoned cluster",
        ));
    }

    if !nat_gateway.enabled && nat_gateway.has_ip_references() {
        errors.push(FieldError::invalid(
            path,
            None,
            "NatGateway is not enabled but ip addresses or ip ranges are specified",
        ));
    }

    let addresses_path = path.child("ipAddresses");
    for (i, reference) in nat_gateway.ip_addresses.iter().enumerate() {
        errors.extend(validate_resource_reference(reference, &addresses_path.index(i)));
    }

    let ranges_path = path.child("ipAddressRanges");
    for (i, reference) in nat_gateway.ip_address_ranges.iter().enumerate() {
        errors.extend(validate_resource_reference(reference, &ranges_path.index(i)));
    }

    errors
}

fn validate_resource_reference(reference: &AzResourceReference, path: &FieldPath) -> FieldErrorList {
    let mut errors = FieldErrorList::new();
    if reference.name.is_empty() {
        errors.push(FieldError::invalid(path, None, "name must be set"));
    }
    if reference.resource_group.is_empty() {
        errors.push(FieldError::invalid(path, None, "resourceGroup must be set"));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_common::crd::NetworkConfig;
    use cirrus_common::field::FieldErrorType;

    const NODES: &str = "10.250.0.0/16";
    const PODS: &str = "100.96.0.0/11";
    const SERVICES: &str = "100.64.0.0/13";
    const VNET_CIDR: &str = "10.0.0.0/8";

    fn base_config() -> InfrastructureConfig {
        InfrastructureConfig {
            networks: NetworkConfig {
                workers: "10.250.3.0/24".to_string(),
                vnet: VNet {
                    cidr: Some(VNET_CIDR.to_string()),
                    ..Default::default()
                },
                nat_gateway: None,
            },
            ..Default::default()
        }
    }

    fn validate(config: &InfrastructureConfig) -> FieldErrorList {
        validate_infrastructure_config(
            config,
            Some(NODES),
            Some(PODS),
            Some(SERVICES),
            &FieldPath::root(),
        )
    }

    fn fields(errors: &FieldErrorList) -> Vec<(&str, &str)> {
        errors
            .iter()
            .map(|e| (e.field.as_str(), e.detail.as_str()))
            .collect()
    }

    #[test]
    fn baseline_config_is_valid() {
        assert!(validate(&base_config()).is_empty());
    }

    #[test]
    fn resource_group_is_forbidden() {
        let mut config = base_config();
        config.resource_group = Some(ResourceGroup::default());

        let errors = validate(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, FieldErrorType::Invalid);
        assert_eq!(errors[0].field, "resourceGroup");
    }

    #[test]
    fn vnet_name_without_group_is_rejected() {
        let mut config = base_config();
        config.networks.vnet = VNet {
            name: Some("existing-vnet".to_string()),
            ..Default::default()
        };

        assert_eq!(
            fields(&validate(&config)),
            vec![(
                "networks.vnet",
                "specifying an existing vnet name require a vnet name and vnet resource group"
            )]
        );
    }

    #[test]
    fn vnet_group_without_name_is_rejected() {
        let mut config = base_config();
        config.networks.vnet = VNet {
            resource_group: Some("existing-vnet-rg".to_string()),
            ..Default::default()
        };

        let errors = validate(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "networks.vnet");
    }

    #[test]
    fn existing_vnet_with_cidr_is_rejected_once() {
        let mut config = base_config();
        config.networks.vnet = VNet {
            name: Some("existing-vnet".to_string()),
            resource_group: Some("existing-vnet-rg".to_string()),
            cidr: Some(VNET_CIDR.to_string()),
        };

        assert_eq!(
            fields(&validate(&config)),
            vec![(
                "networks.vnet.cidr",
                "specifying a cidr for an existing vnet is not possible"
            )]
        );
    }

    #[test]
    fn existing_vnet_in_cluster_resource_group_is_rejected() {
        let group = "shoot--test--foo";
        let mut config = base_config();
        config.networks.vnet = VNet {
            name: Some("existing-vnet".to_string()),
            resource_group: Some(group.to_string()),
            cidr: None,
        };
        config.resource_group = Some(ResourceGroup {
            name: group.to_string(),
        });

        let errors = validate(&config);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "resourceGroup");
        assert_eq!(errors[1].field, "networks.vnet.resourceGroup");
        assert_eq!(
            errors[1].detail,
            "the vnet resource group must not be the same as the cluster resource group"
        );
    }

    #[test]
    fn missing_vnet_cidr_defers_to_defaults() {
        let config = InfrastructureConfig {
            networks: NetworkConfig {
                workers: "10.250.3.0/24".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let errors = validate_infrastructure_config(
            &config,
            Some("10.250.3.0/24"),
            Some(PODS),
            Some(SERVICES),
            &FieldPath::root(),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn invalid_vnet_cidr_is_rejected() {
        let mut config = base_config();
        config.networks.vnet.cidr = Some("invalid-cidr".to_string());

        assert_eq!(
            fields(&validate(&config)),
            vec![("networks.vnet.cidr", "invalid CIDR address: invalid-cidr")]
        );
    }

    #[test]
    fn invalid_and_empty_workers_are_rejected() {
        let mut config = base_config();
        config.networks.workers = "invalid-cidr".to_string();
        assert_eq!(
            fields(&validate(&config)),
            vec![("networks.workers", "invalid CIDR address: invalid-cidr")]
        );

        config.networks.workers = String::new();
        assert_eq!(
            fields(&validate(&config)),
            vec![("networks.workers", "invalid CIDR address: ")]
        );
    }

    #[test]
    fn workers_outside_nodes_and_vnet_yield_two_errors() {
        let mut config = base_config();
        config.networks.workers = "1.1.1.1/32".to_string();

        assert_eq!(
            fields(&validate(&config)),
            vec![
                ("networks.workers", r#"must be a subset of "" ("10.250.0.0/16")"#),
                (
                    "networks.workers",
                    r#"must be a subset of "networks.vnet.cidr" ("10.0.0.0/8")"#
                ),
            ]
        );
    }

    #[test]
    fn pod_and_service_cidrs_must_not_overlap_vnet() {
        let config = base_config();
        let overlapping = "10.0.0.1/32";

        for (pods, services) in [(overlapping, SERVICES), (PODS, overlapping)] {
            let errors = validate_infrastructure_config(
                &config,
                Some(NODES),
                Some(pods),
                Some(services),
                &FieldPath::root(),
            );
            assert_eq!(
                fields(&errors),
                vec![("", r#"must not be a subset of "networks.vnet.cidr" ("10.0.0.0/8")"#)]
            );
        }
    }

    #[test]
    fn non_canonical_cidrs_are_rejected() {
        let mut config = base_config();
        config.networks.workers = "10.250.3.8/24".to_string();
        config.networks.vnet = VNet {
            cidr: Some("10.0.0.3/8".to_string()),
            ..Default::default()
        };

        let errors = validate_infrastructure_config(
            &config,
            Some("10.250.0.3/16"),
            Some("100.96.0.4/11"),
            Some("100.64.0.5/13"),
            &FieldPath::root(),
        );
        assert_eq!(
            fields(&errors),
            vec![
                ("networks.vnet.cidr", "must be valid canonical CIDR"),
                ("networks.workers", "must be valid canonical CIDR"),
            ]
        );
    }

    #[test]
    fn identity_requires_name_and_group() {
        let mut config = base_config();
        config.identity = Some(IdentityConfig {
            name: "test-identity".to_string(),
            resource_group: "identity-resource-group".to_string(),
        });
        assert!(validate(&config).is_empty());

        config.identity = Some(IdentityConfig {
            name: "test-identity".to_string(),
            resource_group: String::new(),
        });
        let errors = validate(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "identity");
    }

    #[test]
    fn nat_gateway_allowed_for_zoned_clusters() {
        let mut config = base_config();
        config.zoned = true;
        config.networks.nat_gateway = Some(NatGatewayConfig {
            enabled: true,
            ..Default::default()
        });
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn nat_gateway_rejected_for_unzoned_clusters() {
        let mut config = base_config();
        config.networks.nat_gateway = Some(NatGatewayConfig::default());

        assert_eq!(
            fields(&validate(&config)),
            vec![(
                "networks.natGateway",
                "NatGateway is currently only supported for zoned cluster"
            )]
        );
    }

    #[test]
    fn disabled_nat_gateway_with_ips_is_rejected() {
        let mut config = base_config();
        config.zoned = true;
        config.networks.nat_gateway = Some(NatGatewayConfig {
            enabled: false,
            ip_addresses: vec![AzResourceReference {
                name: "test-ip".to_string(),
                resource_group: "test-rg".to_string(),
            }],
            ..Default::default()
        });

        assert_eq!(
            fields(&validate(&config)),
            vec![(
                "networks.natGateway",
                "NatGateway is not enabled but ip addresses or ip ranges are specified"
            )]
        );
    }

    #[test]
    fn nat_gateway_references_need_name_and_group() {
        let mut config = base_config();
        config.zoned = true;
        config.networks.nat_gateway = Some(NatGatewayConfig {
            enabled: true,
            ip_addresses: vec![AzResourceReference {
                name: "test-ip".to_string(),
                ..Default::default()
            }],
            ip_address_ranges: vec![
                AzResourceReference {
                    resource_group: "test-rg".to_string(),
                    ..Default::default()
                },
                AzResourceReference::default(),
            ],
        });

        assert_eq!(
            fields(&validate(&config)),
            vec![
                ("networks.natGateway.ipAddresses[0]", "resourceGroup must be set"),
                ("networks.natGateway.ipAddressRanges[0]", "name must be set"),
                ("networks.natGateway.ipAddressRanges[1]", "name must be set"),
                ("networks.natGateway.ipAddressRanges[1]", "resourceGroup must be set"),
            ]
        );
    }

    #[test]
    fn unzoned_disabled_nat_gateway_accumulates_errors() {
        let mut config = base_config();
        config.networks.nat_gateway = Some(NatGatewayConfig {
            enabled: false,
            ip_address_ranges: vec![AzResourceReference::default()],
            ..Default::default()
        });

        let errors = validate(&config);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn base_path_prefixes_all_fields() {
        let mut config = base_config();
        config.resource_group = Some(ResourceGroup::default());
        let errors = validate_infrastructure_config(
            &config,
            Some(NODES),
            Some(PODS),
            Some(SERVICES),
            &FieldPath::new("spec").child("infrastructureConfig"),
        );
        assert_eq!(errors[0].field, "spec.infrastructureConfig.resourceGroup");
    }

    #[test]
    fn unchanged_config_update_is_valid() {
        let config = base_config();
        assert!(
            validate_infrastructure_config_update(&config, &config, &FieldPath::root()).is_empty()
        );
    }

    #[test]
    fn changing_resource_group_is_invalid() {
        let old = base_config();
        let mut new = old.clone();
        new.resource_group = Some(ResourceGroup::default());

        let errors = validate_infrastructure_config_update(&old, &new, &FieldPath::root());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, FieldErrorType::Invalid);
        assert_eq!(errors[0].field, "resourceGroup");
    }

    #[test]
    fn changing_vnet_is_invalid() {
        let old = base_config();
        let mut new = old.clone();
        new.networks.vnet.cidr = Some("1.2.3.4/5".to_string());

        let errors = validate_infrastructure_config_update(&old, &new, &FieldPath::root());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, FieldErrorType::Invalid);
        assert_eq!(errors[0].field, "networks.vnet");
    }

    #[test]
    fn zoned_to_unzoned_is_forbidden() {
        let mut old = base_config();
        old.zoned = true;
        let new = base_config();

        let errors = validate_infrastructure_config_update(&old, &new, &FieldPath::root());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, FieldErrorType::Forbidden);
        assert_eq!(errors[0].field, "zoned");
    }

    #[test]
    fn unzoned_to_zoned_is_allowed() {
        let old = base_config();
        let mut new = base_config();
        new.zoned = true;
        new.networks.workers = "10.250.4.0/24".to_string();

        assert!(validate_infrastructure_config_update(&old, &new, &FieldPath::root()).is_empty());
    }
}
