// Copyright (c) 2025 - Cowboy AI, Inc.
//! Environment device topology for the Composable Information Machine
//!
//! This crate keeps the devices of an environment (security managers,
//! receivers, log managers and their combination appliances) in an id-keyed
//! arena and enforces the rules every device write must satisfy.
//!
//! ## Architecture
//!
//! 1. **Domain**: devices, builds and resources as value objects, plus the
//!    pure invariant functions in [`domain::invariants`]
//! 2. **Ports**: [`ports::BuildCatalog`] and [`ports::ResourceRegistry`] are
//!    the seams to the systems that own builds and physical resources
//! 3. **State Machine**: the resource lifecycle (idle, active, keying,
//!    disabled) as a Mealy machine
//! 4. **Topology**: [`DeviceTopology`] validates, indexes and records events
//!
//! ## Usage
//!
//! ```rust
//! use cim_device_topology::domain::{DeviceDraft, DeviceType, EnvironmentId};
//! use cim_device_topology::ports::{InMemoryBuildCatalog, InMemoryResourceRegistry};
//! use cim_device_topology::DeviceTopology;
//!
//! let mut builds = InMemoryBuildCatalog::new();
//! let build = builds.add_version("10.1.0");
//! let mut topology = DeviceTopology::new(builds, InMemoryResourceRegistry::new());
//!
//! let env = EnvironmentId::new();
//! let root = topology
//!     .register(DeviceDraft::new(DeviceType::Esm, build, env).clustering(6, 3))
//!     .unwrap();
//!
//! // 7 nodes cannot be split into clusters of 3
//! assert!(topology.set_nodes(root, 7).is_err());
//! ```

pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod snapshot;
pub mod state_machine;
pub mod topology;

// Re-export commonly used types
pub use config::{ReleasePolicy, TopologyConfig};
pub use domain::{
    Build, ClusterVersion, Device, DeviceDraft, DeviceId, DeviceType, HostType, ResourceRef,
    ResourceState, ValidationError, ValidationErrors,
};
pub use errors::{TopologyError, TopologyResult};
pub use events::TopologyEvent;
pub use snapshot::{InMemoryTopology, LoadedSnapshot, TopologySnapshot};
pub use topology::{DeviceTopology, ReleaseOutcome, RemovalOutcome};
