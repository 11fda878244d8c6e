//! Machine image resolution and accelerated networking support

use cirrus_common::crd::{CloudProfileConfig, ImageReference, MachineImage, WorkerStatus};
use cirrus_common::{Error, Result};
use tracing::debug;

/// Resolves a machine image name and version to a concrete Azure image
#[cfg_attr(test, mockall::automock)]
pub trait ImageResolver: Send + Sync {
    /// Find the URN or image ID for `name` at `version`
    fn find_machine_image(&self, name: &str, version: &str) -> Result<ImageReference>;
}

/// Decides whether a pool gets accelerated networking
#[cfg_attr(test, mockall::automock)]
pub trait AcceleratedNetworking: Send + Sync {
    /// Whether both the image version and the machine type support it
    fn supports_accelerated_networking(
        &self,
        machine_type: &str,
        image_name: &str,
        image_version: &str,
    ) -> bool;
}

impl AcceleratedNetworking for CloudProfileConfig {
    fn supports_accelerated_networking(
        &self,
        machine_type: &str,
        image_name: &str,
        image_version: &str,
    ) -> bool {
        // Every listed entry must opt in; an unset flag counts as unsupported
        let mut versions = self
            .machine_images
            .iter()
            .filter(|image| image.name == image_name)
            .flat_map(|image| image.versions.iter())
            .filter(|v| v.version == image_version)
            .peekable();
        if versions.peek().is_none() {
            return false;
        }
        if !versions.all(|v| v.accelerated_networking == Some(true)) {
            return false;
        }

        self.accelerated_networking_machine_types
            .iter()
            .any(|t| t == machine_type)
    }
}

/// Image resolver backed by the cloud profile
///
/// Falls back to the images recorded in the worker status so that pools keep
/// working after an image version is removed from the profile.
#[derive(Clone, Copy, Debug)]
pub struct CloudProfileImages<'a> {
    profile: &'a CloudProfileConfig,
    worker_status: Option<&'a WorkerStatus>,
}

impl<'a> CloudProfileImages<'a> {
    /// Create a resolver over a cloud profile and an optional worker status
    pub fn new(profile: &'a CloudProfileConfig, worker_status: Option<&'a WorkerStatus>) -> Self {
        Self {
            profile,
            worker_status,
        }
    }

    fn recorded_image(&self, name: &str, version: &str) -> Option<&'a MachineImage> {
        self.worker_status?
            .machine_images
            .iter()
            .find(|image| image.name == name && image.version == version)
    }
}

impl ImageResolver for CloudProfileImages<'_> {
    fn find_machine_image(&self, name: &str, version: &str) -> Result<ImageReference> {
        if let Some(entry) = self.profile.find_image_version(name, version) {
            return ImageReference::from_parts(entry.urn.as_deref(), entry.id.as_deref())
                .ok_or_else(|| {
                    Error::image(name, version, "exactly one of urn or id must be set")
                });
        }

        match self.recorded_image(name, version) {
            Some(image) => {
                debug!(image = name, version, "resolved machine image from worker status");
                Ok(image.reference.clone())
            }
            None => Err(Error::image(
                name,
                version,
                "not found in cloud profile or worker status",
            )),
        }
    }
}
