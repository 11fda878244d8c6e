//! Centralized constants for the cirrus-machines crate

// =============================================================================
// Machine Classes
// =============================================================================

/// Kind of the machine class resources handed to the machine controller
pub const MACHINE_CLASS_KIND: &str = "AzureMachineClass";

/// Chart that renders machine classes
pub const MACHINE_CLASS_CHART: &str = "machineclass";

/// Key of the chart values holding the machine class list
pub const MACHINE_CLASSES_VALUES_KEY: &str = "machineClasses";

/// Label key marking the purpose of a generated resource
pub const PURPOSE_LABEL: &str = "gardener.cloud/purpose";

/// Purpose label value of machine classes
pub const PURPOSE_MACHINE_CLASS: &str = "machineclass";

// =============================================================================
// Tags
// =============================================================================

/// Tag key carrying the cluster namespace
pub const NAME_TAG: &str = "Name";

/// Prefix of the per-cluster ownership tag, followed by the namespace
pub const CLUSTER_TAG_PREFIX: &str = "kubernetes.io-cluster-";

/// Tag marking a VM as a worker node
pub const NODE_ROLE_TAG: &str = "kubernetes.io-role-node";

/// Value of the marker tags
pub const MARKER_TAG_VALUE: &str = "1";

// =============================================================================
// Volumes
// =============================================================================

/// Storage account types passed through to the OS disk
///
/// Other values are dropped: older clusters may carry types the machine
/// controller never applied.
pub const VALID_VOLUME_TYPES: [&str; 3] = ["Standard_LRS", "StandardSSD_LRS", "Premium_LRS"];
