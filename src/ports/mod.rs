// Copyright (c) 2025 - Cowboy AI, Inc.
//! External Collaborator Ports
//!
//! The topology does not own builds or resources. It reaches them through the
//! traits in this module:
//!
//! - [`BuildCatalog`] - resolves a build id to its version string
//! - [`ResourceRegistry`] - reads and idles external resources
//!
//! In-memory implementations back the tests, the snapshot loader and the
//! `topology-validate` binary.

pub mod build_catalog;
pub mod resource_registry;

pub use build_catalog::{BuildCatalog, InMemoryBuildCatalog};
pub use resource_registry::{
    InMemoryResourceRegistry, RegistryError, RegistryResult, ResourceRegistry,
};
