//! Worker delegate: generates machine configuration once and applies classes
//!
//! The delegate decodes the infrastructure status, fetches credentials and
//! runs the expansion with the default oracles. The result is memoised, so
//! deployments, images and classes always come from the same pass.

use std::sync::Arc;

use async_trait::async_trait;
use cirrus_common::credentials::CredentialsProvider;
use cirrus_common::crd::{
    decode_json, CloudProfileConfig, InfrastructureStatus, MachineImage, Worker,
};
use cirrus_common::Result;
use once_cell::sync::OnceCell;
use tracing::info;

use crate::class::MachineClass;
use crate::constants::{MACHINE_CLASS_CHART, MACHINE_CLASS_KIND};
use crate::deployment::{MachineConfig, MachineDeployment};
use crate::disk::DigitRunSizer;
use crate::distribution::DefaultDistributor;
use crate::expander::{generate_machine_config, ExpansionContext};
use crate::hasher::Sha256PoolHasher;
use crate::image::CloudProfileImages;

/// Sink that renders machine classes into the cluster
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MachineClassApplier: Send + Sync {
    /// Render `classes` with `chart` into `namespace`
    async fn apply(&self, namespace: &str, chart: &str, classes: &[MachineClass]) -> Result<()>;
}

/// Generates and deploys the machine configuration of one worker
pub struct WorkerDelegate {
    worker: Worker,
    cloud_profile: CloudProfileConfig,
    credentials: Arc<dyn CredentialsProvider>,
    applier: Arc<dyn MachineClassApplier>,
    generated: OnceCell<MachineConfig>,
}

impl WorkerDelegate {
    /// Create a delegate for `worker`
    pub fn new(
        worker: Worker,
        cloud_profile: CloudProfileConfig,
        credentials: Arc<dyn CredentialsProvider>,
        applier: Arc<dyn MachineClassApplier>,
    ) -> Self {
        Self {
            worker,
            cloud_profile,
            credentials,
            applier,
            generated: OnceCell::new(),
        }
    }

    /// Kind of the machine classes this delegate produces
    pub fn machine_class_kind(&self) -> &'static str {
        MACHINE_CLASS_KIND
    }

    /// Desired machine deployments, generating them on first use
    pub fn generate_machine_deployments(&self) -> Result<&[MachineDeployment]> {
        Ok(&self.machine_config()?.deployments)
    }

    /// Images referenced by the pools, generating them on first use
    pub fn machine_images(&self) -> Result<&[MachineImage]> {
        Ok(&self.machine_config()?.images)
    }

    /// Hand the machine classes to the applier, generating them on first use
    pub async fn deploy_machine_classes(&self) -> Result<()> {
        let classes = &self.machine_config()?.classes;
        self.applier
            .apply(&self.worker.namespace, MACHINE_CLASS_CHART, classes)
            .await?;
        info!(
            namespace = %self.worker.namespace,
            classes = classes.len(),
            "deployed machine classes"
        );
        Ok(())
    }

    /// Deployments, classes and images together, generating them on first use
    pub fn machine_config(&self) -> Result<&MachineConfig> {
        self.generated.get_or_try_init(|| self.generate())
    }

    fn generate(&self) -> Result<MachineConfig> {
        let spec = &self.worker.spec;

        let credentials = self.credentials.client_auth(&spec.secret_ref)?;
        let status: InfrastructureStatus =
            decode_json("InfrastructureStatus", &spec.infrastructure_provider_status)?;

        let hasher = Sha256PoolHasher::new(spec.kubernetes_version.clone());
        let images = CloudProfileImages::new(&self.cloud_profile, self.worker.status.as_ref());

        let ctx = ExpansionContext {
            namespace: &self.worker.namespace,
            region: &spec.region,
            ssh_public_key: &spec.ssh_public_key,
            credentials: &credentials,
            hasher: &hasher,
            images: &images,
            accelerated_networking: &self.cloud_profile,
            disk_sizer: &DigitRunSizer,
            distributor: &DefaultDistributor,
        };
        generate_machine_config(&ctx, &status, &spec.pools)
    }
}
