// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology snapshots
//!
//! A snapshot is a JSON document describing builds, resources and device
//! drafts. Loading one replays every draft through the normal write path, so
//! the result says which devices the engine would accept.
//!
//! ```json
//! {
//!   "builds":    [{ "id": "…", "version": "10.1.0" }],
//!   "resources": [{ "id": "hsm-1", "state": "keying" }],
//!   "devices":   [{ "id": "…", "device_type": "esm", "build_id": "…",
//!                   "environment_id": "…", "nodes": 3, "factor": 3 }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::config::TopologyConfig;
use crate::domain::{Build, DeviceDraft, DeviceId, ResourceRef, ResourceState};
use crate::errors::{TopologyError, TopologyResult};
use crate::ports::{InMemoryBuildCatalog, InMemoryResourceRegistry};
use crate::topology::DeviceTopology;

/// A resource entry in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotResource {
    pub id: ResourceRef,

    #[serde(default)]
    pub state: ResourceState,
}

/// Serialized description of a topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    #[serde(default)]
    pub builds: Vec<Build>,

    #[serde(default)]
    pub resources: Vec<SnapshotResource>,

    #[serde(default)]
    pub devices: Vec<DeviceDraft>,
}

/// Topology backed by in-memory collaborators
pub type InMemoryTopology = DeviceTopology<InMemoryBuildCatalog, InMemoryResourceRegistry>;

/// A draft the topology refused
#[derive(Debug)]
pub struct RejectedDevice {
    pub draft: DeviceDraft,
    pub error: TopologyError,
}

/// Result of loading a snapshot
#[derive(Debug)]
pub struct LoadedSnapshot {
    pub topology: InMemoryTopology,
    pub accepted: Vec<DeviceId>,
    pub rejected: Vec<RejectedDevice>,
}

impl LoadedSnapshot {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl TopologySnapshot {
    pub fn from_json(json: &str) -> TopologyResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> TopologyResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TopologyError::Snapshot(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Device drafts ordered so that every parent precedes its children
    ///
    /// Drafts whose parent is not part of the snapshot keep their relative
    /// order; drafts caught in a parent cycle come last.
    pub fn ordered_devices(&self) -> Vec<DeviceDraft> {
        let known: HashSet<DeviceId> = self.devices.iter().filter_map(|d| d.id).collect();
        let mut placed: HashSet<DeviceId> = HashSet::new();
        let mut pending: Vec<&DeviceDraft> = self.devices.iter().collect();
        let mut ordered = Vec::with_capacity(self.devices.len());

        loop {
            let before = pending.len();
            pending.retain(|draft| {
                let ready = match draft.parent_id {
                    Some(parent) => !known.contains(&parent) || placed.contains(&parent),
                    None => true,
                };
                if ready {
                    if let Some(id) = draft.id {
                        placed.insert(id);
                    }
                    ordered.push((*draft).clone());
                }
                !ready
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }

        ordered.extend(pending.into_iter().cloned());
        ordered
    }

    /// Build an in-memory topology and replay every device draft into it
    pub fn load(&self, config: TopologyConfig) -> LoadedSnapshot {
        let builds: InMemoryBuildCatalog = self.builds.iter().cloned().collect();

        let mut resources = InMemoryResourceRegistry::new();
        for resource in &self.resources {
            resources.insert(resource.id.clone(), resource.state);
        }

        let mut topology = DeviceTopology::with_config(config, builds, resources);
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for draft in self.ordered_devices() {
            match topology.register(draft.clone()) {
                Ok(id) => accepted.push(id),
                Err(error) => {
                    debug!("Snapshot device rejected: {}", error);
                    rejected.push(RejectedDevice { draft, error });
                }
            }
        }

        LoadedSnapshot {
            topology,
            accepted,
            rejected,
        }
    }
}
