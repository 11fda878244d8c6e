//! Expansion of Azure worker pools into machine deployments and machine classes
//!
//! [`generate_machine_config`] is the pure expansion; every external input is
//! an oracle trait so it can be swapped in tests. [`WorkerDelegate`] wires the
//! default oracles to a worker resource and memoises the result.

#![deny(missing_docs)]

pub mod class;
pub mod constants;
pub mod delegate;
pub mod deployment;
pub mod disk;
pub mod distribution;
pub mod expander;
pub mod hasher;
pub mod image;

pub use class::{machine_class_values, MachineClass, MachineClassSecret, NetworkReference, OsDisk};
pub use delegate::{MachineClassApplier, WorkerDelegate};
pub use deployment::{MachineConfig, MachineDeployment};
pub use disk::{DiskSizer, DigitRunSizer};
pub use distribution::{DefaultDistributor, ZoneDistributor};
pub use expander::{generate_machine_config, ExpansionContext};
pub use hasher::{PoolHasher, Sha256PoolHasher};
pub use image::{AcceleratedNetworking, CloudProfileImages, ImageResolver};
