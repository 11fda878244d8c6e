//! Expansion of worker pools into machine deployments and machine classes
//!
//! Unzoned clusters get one deployment per pool, placed in the nodes
//! availability set. Zoned clusters get one deployment per pool and zone with
//! the pool's limits split across the zones.
//!
//! The expansion is a pure function of its inputs: the same status, pools and
//! oracles always produce the same output. Any failure aborts the whole
//! expansion.

use std::collections::BTreeMap;

use cirrus_common::credentials::ClientAuth;
use cirrus_common::crd::{InfrastructureStatus, MachineImage, Purpose, WorkerPool};
use cirrus_common::Result;
use tracing::{debug, info, warn};

use crate::class::{MachineClass, MachineClassSecret, NetworkReference, OsDisk};
use crate::constants::{
    CLUSTER_TAG_PREFIX, MARKER_TAG_VALUE, NAME_TAG, NODE_ROLE_TAG, PURPOSE_LABEL,
    PURPOSE_MACHINE_CLASS, VALID_VOLUME_TYPES,
};
use crate::deployment::{MachineConfig, MachineDeployment};
use crate::disk::DiskSizer;
use crate::distribution::ZoneDistributor;
use crate::hasher::PoolHasher;
use crate::image::{AcceleratedNetworking, ImageResolver};

/// Per-worker inputs and oracles of an expansion
#[derive(Clone, Copy)]
pub struct ExpansionContext<'a> {
    /// Cluster namespace, prefix of every generated name
    pub namespace: &'a str,
    /// Azure region
    pub region: &'a str,
    /// Public SSH key for the machines
    pub ssh_public_key: &'a str,
    /// Service principal injected into every class secret
    pub credentials: &'a ClientAuth,
    /// Pool fingerprinting
    pub hasher: &'a dyn PoolHasher,
    /// Image lookup
    pub images: &'a dyn ImageResolver,
    /// Accelerated networking predicate
    pub accelerated_networking: &'a dyn AcceleratedNetworking,
    /// Volume size parsing
    pub disk_sizer: &'a dyn DiskSizer,
    /// Per-zone splitting of limits
    pub distributor: &'a dyn ZoneDistributor,
}

/// Position of a zone within a pool's zone list
#[derive(Clone, Copy, Debug)]
struct ZoneInfo<'p> {
    name: &'p str,
    index: usize,
    count: usize,
}

/// Where the machines of one deployment unit are placed
#[derive(Clone, Copy, Debug)]
enum Placement<'p> {
    AvailabilitySet(&'p str),
    Zone(ZoneInfo<'p>),
}

/// Expand `pools` against the resolved infrastructure
///
/// Fails when the nodes subnet (or, for unzoned clusters, the nodes
/// availability set) is missing, or when any oracle fails.
pub fn generate_machine_config(
    ctx: &ExpansionContext<'_>,
    status: &InfrastructureStatus,
    pools: &[WorkerPool],
) -> Result<MachineConfig> {
    let nodes_subnet = status.networks.find_subnet_by_purpose(Purpose::Nodes)?;

    let availability_set = if status.zoned {
        None
    } else {
        Some(status.find_availability_set_by_purpose(Purpose::Nodes)?)
    };

    let salt: Vec<String> = status
        .identity
        .iter()
        .map(|identity| identity.id.clone())
        .collect();

    let mut config = MachineConfig::default();

    for pool in pools {
        let pool_hash = ctx.hasher.hash(pool, &salt)?;

        let image = ctx
            .images
            .find_machine_image(&pool.machine_image.name, &pool.machine_image.version)?;
        config.add_image(MachineImage {
            name: pool.machine_image.name.clone(),
            version: pool.machine_image.version.clone(),
            reference: image.clone(),
        });

        let os_disk = OsDisk {
            size: ctx.disk_sizer.disk_size(&pool.volume.size)?,
            type_: volume_type(pool),
        };

        let accelerated_networking = ctx.accelerated_networking.supports_accelerated_networking(
            &pool.machine_type,
            &pool.machine_image.name,
            &pool.machine_image.version,
        );

        let template = MachineClass {
            name: String::new(),
            labels: BTreeMap::from([(
                PURPOSE_LABEL.to_string(),
                PURPOSE_MACHINE_CLASS.to_string(),
            )]),
            region: ctx.region.to_string(),
            resource_group: status.resource_group.name.clone(),
            tags: node_tags(ctx.namespace),
            secret: MachineClassSecret::new(pool.user_data.clone(), ctx.credentials),
            machine_type: pool.machine_type.clone(),
            image,
            os_disk,
            ssh_public_key: ctx.ssh_public_key.to_string(),
            network: NetworkReference {
                vnet: status.networks.vnet.name.clone(),
                subnet: nodes_subnet.name.clone(),
                accelerated_networking: accelerated_networking.then_some(true),
            },
            vnet_resource_group: status.networks.vnet.resource_group.clone(),
            zone: None,
            availability_set_id: None,
            identity_id: status.identity.as_ref().map(|identity| identity.id.clone()),
            extra: BTreeMap::new(),
        };

        let base_deployment_name = format!("{}-{}", ctx.namespace, pool.name);
        let base_class_name = format!("{}-{}", base_deployment_name, pool_hash);

        match availability_set {
            Some(set) => {
                let (deployment, class) = generate_unit(
                    ctx,
                    pool,
                    &template,
                    &base_deployment_name,
                    &base_class_name,
                    Placement::AvailabilitySet(&set.id),
                );
                config.push(deployment, class);
            }
            None => {
                let count = pool.zones.len();
                for (index, name) in pool.zones.iter().enumerate() {
                    let zone = ZoneInfo { name, index, count };
                    let (deployment, class) = generate_unit(
                        ctx,
                        pool,
                        &template,
                        &base_deployment_name,
                        &base_class_name,
                        Placement::Zone(zone),
                    );
                    config.push(deployment, class);
                }
            }
        }
    }

    info!(
        namespace = ctx.namespace,
        pools = pools.len(),
        deployments = config.deployments.len(),
        images = config.images.len(),
        "generated machine configuration"
    );

    Ok(config)
}

fn generate_unit(
    ctx: &ExpansionContext<'_>,
    pool: &WorkerPool,
    template: &MachineClass,
    base_deployment_name: &str,
    base_class_name: &str,
    placement: Placement<'_>,
) -> (MachineDeployment, MachineClass) {
    let mut class = template.clone();

    let (deployment_name, class_name) = match placement {
        Placement::AvailabilitySet(id) => {
            class.availability_set_id = Some(id.to_string());
            (base_deployment_name.to_string(), base_class_name.to_string())
        }
        Placement::Zone(zone) => {
            class.zone = Some(zone.name.to_string());
            (
                format!("{}-z{}", base_deployment_name, zone.name),
                format!("{}-z{}", base_class_name, zone.name),
            )
        }
    };

    let mut deployment = MachineDeployment::for_pool(pool, deployment_name, class_name.clone());
    if let Placement::Zone(zone) = placement {
        let distributor = ctx.distributor;
        deployment.minimum = distributor.distribute_over_zones(zone.index, pool.minimum, zone.count);
        deployment.maximum = distributor.distribute_over_zones(zone.index, pool.maximum, zone.count);
        deployment.max_surge = distributor.distribute_positive_int_or_percent(
            zone.index,
            &pool.max_surge,
            zone.count,
            pool.maximum,
        );
        deployment.max_unavailable = distributor.distribute_positive_int_or_percent(
            zone.index,
            &pool.max_unavailable,
            zone.count,
            pool.maximum,
        );
    }

    class.name = class_name;

    debug!(
        pool = %pool.name,
        zone = class.zone.as_deref().unwrap_or_default(),
        deployment = %deployment.name,
        class = %class.name,
        "generated machine deployment"
    );

    (deployment, class)
}

fn volume_type(pool: &WorkerPool) -> Option<String> {
    let requested = pool.volume.type_.as_deref()?;
    if VALID_VOLUME_TYPES.contains(&requested) {
        return Some(requested.to_string());
    }
    warn!(
        pool = %pool.name,
        volume_type = requested,
        "ignoring unsupported volume type, using the machine type default"
    );
    None
}

fn node_tags(namespace: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (NAME_TAG.to_string(), namespace.to_string()),
        (
            format!("{CLUSTER_TAG_PREFIX}{namespace}"),
            MARKER_TAG_VALUE.to_string(),
        ),
        (NODE_ROLE_TAG.to_string(), MARKER_TAG_VALUE.to_string()),
    ])
}
