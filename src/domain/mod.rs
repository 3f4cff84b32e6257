// Copyright (c) 2025 - Cowboy AI, Inc.
//! Environment Device Domain Models
//!
//! Core domain concepts for environment device topologies: devices and their
//! drafts, builds and the clustering version gate, device addressing, the
//! external resource states devices are backed by, and the pure invariants a
//! device write must satisfy.
//!
//! # Value Objects
//!
//! - [`DeviceId`], [`BuildId`], [`EnvironmentId`] - UUID v7 identities
//! - [`ResourceRef`] - reference to an externally-owned resource
//! - [`BuildVersion`] / [`ClusterVersion`] - version parsing and threshold
//! - [`IpSyntaxValidator`] - pluggable management address check
//!
//! # Entities
//!
//! - [`Device`] - validated topology node
//! - [`DeviceDraft`] - unvalidated write-side form

pub mod build;
pub mod device;
pub mod invariants;
pub mod keying;
pub mod network;
pub mod resource;

pub use build::{Build, BuildVersion, ClusterVersion, VersionError};
pub use device::{
    BuildId, Device, DeviceDraft, DeviceId, DeviceParseError, DeviceType, EnvironmentId,
    HostType, ResourceRef,
};
pub use invariants::{ValidationError, ValidationErrors, ValidationResult};
pub use keying::{is_device_keying, keying_children_count};
pub use network::{IpSyntaxValidator, StdIpSyntaxValidator};
pub use resource::ResourceState;
