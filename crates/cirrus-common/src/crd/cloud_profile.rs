//! Operator-level cloud profile configuration
//!
//! Lists the machine images the operator offers and which machine types
//! support accelerated networking.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Provider section of a cloud profile
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudProfileConfig {
    /// Offered machine images
    #[serde(default)]
    pub machine_images: Vec<MachineImages>,

    /// Machine types that support accelerated networking
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accelerated_networking_machine_types: Vec<String>,
}

impl CloudProfileConfig {
    /// Find the entry for an image name and version
    pub fn find_image_version(&self, name: &str, version: &str) -> Option<&MachineImageVersion> {
        self.machine_images
            .iter()
            .filter(|image| image.name == name)
            .flat_map(|image| image.versions.iter())
            .find(|v| v.version == version)
    }
}

/// All versions of one machine image
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct MachineImages {
    /// Image name
    pub name: String,
    /// Available versions
    #[serde(default)]
    pub versions: Vec<MachineImageVersion>,
}

/// One version of a machine image
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MachineImageVersion {
    /// Version string
    pub version: String,

    /// Marketplace URN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,

    /// Resource ID of a custom image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Whether this version supports accelerated networking; unset means no
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerated_networking: Option<bool>,
}
