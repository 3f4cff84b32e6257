// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-device-topology
//!
//! Provides deterministic builds, resources and identifiers for the
//! integration tests. All UUIDs are fixed constants so failures are
//! reproducible.
//!
//! # Design Principles
//! - No `Uuid::now_v7()` in fixture data
//! - Builds and resources are created here, tests only pick from them

#![allow(dead_code)]

use uuid::Uuid;

use cim_device_topology::domain::{BuildId, DeviceDraft, DeviceId, DeviceType, EnvironmentId};
use cim_device_topology::ports::{InMemoryBuildCatalog, InMemoryResourceRegistry};
use cim_device_topology::{Build, DeviceTopology, ResourceState, TopologyConfig};

// Fixed test UUIDs (UUID v7 format, but deterministic for testing)
pub const BUILD_CURRENT: &str = "01934f4a-b001-7000-8000-00000000b001";
pub const BUILD_LEGACY: &str = "01934f4a-b002-7000-8000-00000000b002";
pub const BUILD_NEWER: &str = "01934f4a-b003-7000-8000-00000000b003";

pub const ENVIRONMENT_1: &str = "01934f4a-e001-7000-8000-00000000e001";

pub const DEVICE_ROOT: &str = "01934f4a-d001-7000-8000-00000000d001";
pub const DEVICE_A: &str = "01934f4a-d002-7000-8000-00000000d002";
pub const DEVICE_B: &str = "01934f4a-d003-7000-8000-00000000d003";
pub const DEVICE_C: &str = "01934f4a-d004-7000-8000-00000000d004";

// Resources seeded into the registry
pub const RESOURCE_KEYING: &str = "hsm-keying";
pub const RESOURCE_ACTIVE: &str = "hsm-active";
pub const RESOURCE_IDLE: &str = "hsm-idle";
pub const RESOURCE_DISABLED: &str = "hsm-disabled";

pub type TestTopology = DeviceTopology<InMemoryBuildCatalog, InMemoryResourceRegistry>;

/// Parse a fixed UUID from a constant string
pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn device_id(s: &str) -> DeviceId {
    DeviceId::from_uuid(parse_uuid(s))
}

/// Build 10.1.0, exactly at the default clustering threshold
pub fn current_build() -> BuildId {
    BuildId::from_uuid(parse_uuid(BUILD_CURRENT))
}

/// Build 10.0.5, too old to cluster
pub fn legacy_build() -> BuildId {
    BuildId::from_uuid(parse_uuid(BUILD_LEGACY))
}

/// Build 11.2.0
pub fn newer_build() -> BuildId {
    BuildId::from_uuid(parse_uuid(BUILD_NEWER))
}

pub fn environment() -> EnvironmentId {
    EnvironmentId::from_uuid(parse_uuid(ENVIRONMENT_1))
}

pub fn build_catalog() -> InMemoryBuildCatalog {
    [
        Build::new(current_build(), "10.1.0"),
        Build::new(legacy_build(), "10.0.5"),
        Build::new(newer_build(), "11.2.0"),
    ]
    .into_iter()
    .collect()
}

pub fn resource_registry() -> InMemoryResourceRegistry {
    let mut registry = InMemoryResourceRegistry::new();
    registry.insert(RESOURCE_KEYING, ResourceState::Keying);
    registry.insert(RESOURCE_ACTIVE, ResourceState::Active);
    registry.insert(RESOURCE_IDLE, ResourceState::Idle);
    registry.insert(RESOURCE_DISABLED, ResourceState::Disabled);
    registry
}

/// Topology with the fixture builds and resources and default configuration
pub fn topology() -> TestTopology {
    DeviceTopology::new(build_catalog(), resource_registry())
}

pub fn topology_with(config: TopologyConfig) -> TestTopology {
    DeviceTopology::with_config(config, build_catalog(), resource_registry())
}

/// Draft on `build` in the fixture environment
pub fn draft(device_type: DeviceType, build: BuildId) -> DeviceDraft {
    DeviceDraft::new(device_type, build, environment())
}
