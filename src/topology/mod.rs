// Copyright (c) 2025 - Cowboy AI, Inc.
//! Device Topology Arena
//!
//! [`DeviceTopology`] owns every device of an environment, keyed by
//! [`DeviceId`]. Parent/child relationships are id-valued: each device stores
//! its `parent_id`, and the arena keeps a parent → children index next to a
//! resource → holder index. Both indexes are maintained on every write, so
//! no device ever owns another.
//!
//! # Write Path
//!
//! ```text
//! DeviceDraft ─┬─ required fields
//!              ├─ resource uniqueness   (resource index)
//!              ├─ parent link           (arena lineage)
//!              ├─ clustering            (BuildCatalog)
//!              ├─ IP syntax             (IpSyntaxValidator)
//!              └─ FIPS flag
//!                     ↓
//!          ValidationErrors (all failures) or Device
//! ```
//!
//! Every check runs on every write; a write is rejected when any of them
//! failed, and the caller receives the complete list.
//!
//! # Removal
//!
//! Removing a device first hands its resource back to the idle pool (unless
//! the resource is disabled) and only then drops the device from the arena.
//! See [`ReleasePolicy`](crate::config::ReleasePolicy) for how release
//! failures are treated.

mod removal;

pub use removal::{ReleaseOutcome, RemovalOutcome};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

use crate::config::TopologyConfig;
use crate::domain::invariants::{
    normalize_fips_flag, validate_clustering, validate_fips_flag, validate_ip_address,
    validate_parent_link, validate_required_fields, validate_resource_uniqueness,
};
use crate::domain::{
    keying_children_count, Device, DeviceDraft, DeviceId, IpSyntaxValidator, ResourceRef,
    StdIpSyntaxValidator, ValidationError, ValidationErrors,
};
use crate::errors::{TopologyError, TopologyResult};
use crate::events::{DeviceRegistered, DeviceUpdated, EventMetadata, TopologyEvent};
use crate::ports::{BuildCatalog, ResourceRegistry};

/// Arena of environment devices with their validation collaborators
#[derive(Debug)]
pub struct DeviceTopology<B, R, V = StdIpSyntaxValidator> {
    config: TopologyConfig,
    builds: B,
    resources: R,
    ip_validator: V,
    devices: BTreeMap<DeviceId, Device>,
    children: HashMap<DeviceId, BTreeSet<DeviceId>>,
    resource_holders: HashMap<ResourceRef, DeviceId>,
    events: Vec<TopologyEvent>,
}

impl<B, R> DeviceTopology<B, R, StdIpSyntaxValidator>
where
    B: BuildCatalog,
    R: ResourceRegistry,
{
    /// Create an empty topology with default configuration
    pub fn new(builds: B, resources: R) -> Self {
        Self::with_config(TopologyConfig::default(), builds, resources)
    }

    pub fn with_config(config: TopologyConfig, builds: B, resources: R) -> Self {
        Self {
            config,
            builds,
            resources,
            ip_validator: StdIpSyntaxValidator,
            devices: BTreeMap::new(),
            children: HashMap::new(),
            resource_holders: HashMap::new(),
            events: Vec::new(),
        }
    }
}

impl<B, R, V> DeviceTopology<B, R, V>
where
    B: BuildCatalog,
    R: ResourceRegistry,
    V: IpSyntaxValidator,
{
    /// Swap the IP syntax validator
    pub fn with_ip_validator<V2>(self, ip_validator: V2) -> DeviceTopology<B, R, V2>
    where
        V2: IpSyntaxValidator,
    {
        DeviceTopology {
            config: self.config,
            builds: self.builds,
            resources: self.resources,
            ip_validator,
            devices: self.devices,
            children: self.children,
            resource_holders: self.resource_holders,
            events: self.events,
        }
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    pub fn builds(&self) -> &B {
        &self.builds
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut R {
        &mut self.resources
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(&id)
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.devices.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// All devices in id order
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Devices without a parent
    pub fn roots(&self) -> impl Iterator<Item = &Device> {
        self.devices.values().filter(|device| device.is_root())
    }

    /// Direct children of a device
    pub fn children(&self, id: DeviceId) -> TopologyResult<Vec<&Device>> {
        self.require(id)?;
        Ok(self
            .children
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|child| self.devices.get(child))
            .collect())
    }

    /// Parent of a device, `None` for roots
    pub fn parent(&self, id: DeviceId) -> TopologyResult<Option<&Device>> {
        let device = self.require(id)?;
        Ok(device.parent_id.and_then(|parent| self.devices.get(&parent)))
    }

    /// Device currently holding a resource
    pub fn device_for_resource(&self, resource: &ResourceRef) -> Option<&Device> {
        self.resource_holders
            .get(resource)
            .and_then(|id| self.devices.get(id))
    }

    /// Number of direct children whose resource is keying
    pub fn keying_children_count(&self, id: DeviceId) -> TopologyResult<usize> {
        let children = self.children(id)?;
        Ok(keying_children_count(children, &self.resources))
    }

    /// Events recorded so far
    pub fn events(&self) -> &[TopologyEvent] {
        &self.events
    }

    /// Drain the recorded events
    pub fn take_events(&mut self) -> Vec<TopologyEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Run every device rule against a draft without writing anything
    ///
    /// `draft.id`, when set, names the device being rewritten so that its own
    /// resource and position in the hierarchy are not reported as conflicts.
    pub fn validate(&self, draft: &DeviceDraft) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.extend(validate_required_fields(draft));

        let holder = draft
            .resource
            .as_ref()
            .and_then(|resource| self.resource_holders.get(resource).copied());
        errors.record(validate_resource_uniqueness(
            draft.resource.as_ref(),
            holder,
            draft.id,
        ));

        if let Some(parent_id) = draft.parent_id {
            let lineage = self.lineage(parent_id);
            errors.record(validate_parent_link(draft.id, parent_id, lineage.as_deref()));
        }

        if let Some(build_id) = draft.build_id {
            match self.builds.build(&build_id) {
                Some(build) => errors.extend(validate_clustering(
                    draft,
                    &build,
                    self.config.min_cluster_version,
                )),
                None => errors.push(ValidationError::UnknownBuild(build_id)),
            }
        }

        errors.record(validate_ip_address(
            draft.ip_address.as_deref(),
            &self.ip_validator,
        ));
        errors.record(validate_fips_flag(draft.fips_enabled.as_ref()));

        errors.into_result()
    }

    /// `start` followed by its ancestors, or `None` if `start` is unknown
    fn lineage(&self, start: DeviceId) -> Option<Vec<DeviceId>> {
        let mut lineage = vec![start];
        let mut current = self.devices.get(&start)?;

        while let Some(parent) = current.parent_id {
            if lineage.contains(&parent) {
                break;
            }
            lineage.push(parent);
            match self.devices.get(&parent) {
                Some(device) => current = device,
                None => break,
            }
        }

        Some(lineage)
    }

    /// Validate a draft and turn it into a device with the given id
    fn materialize(&self, draft: DeviceDraft, id: DeviceId) -> Result<Device, ValidationErrors> {
        self.validate(&draft)?;

        let (Some(device_type), Some(build_id), Some(environment_id)) =
            (draft.device_type, draft.build_id, draft.environment_id)
        else {
            return Err(validate_required_fields(&draft).into_iter().collect());
        };
        let fips_enabled = normalize_fips_flag(draft.fips_enabled.as_ref())
            .map_err(|e| ValidationErrors::from_iter([e]))?;

        Ok(Device {
            id,
            device_type,
            host_type: draft.host_type,
            build_id,
            environment_id,
            resource: draft.resource,
            parent_id: draft.parent_id,
            nodes: draft.nodes,
            factor: draft.factor,
            ip_address: draft.ip_address,
            fips_enabled,
        })
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Validate a draft and add it to the topology
    ///
    /// Uses `draft.id` when given, otherwise assigns a fresh id.
    pub fn register(&mut self, draft: DeviceDraft) -> TopologyResult<DeviceId> {
        if let Some(id) = draft.id {
            if self.contains(id) {
                return Err(TopologyError::DuplicateDevice(id));
            }
        }

        let id = draft.id.unwrap_or_default();
        let mut draft = draft;
        draft.id = Some(id);

        let device = self.materialize(draft, id).map_err(|errors| {
            warn!("Rejected registration of device {}: {}", id, errors);
            TopologyError::Validation(errors)
        })?;

        info!(
            "Registered {} device {} (parent: {:?}, factor: {})",
            device.device_type, id, device.parent_id, device.factor
        );
        self.insert(device.clone());
        self.record(TopologyEvent::DeviceRegistered(DeviceRegistered {
            metadata: EventMetadata::now(),
            device,
        }));

        Ok(id)
    }

    /// Replace a device with a re-validated draft, keeping its id
    pub fn update(&mut self, id: DeviceId, draft: DeviceDraft) -> TopologyResult<()> {
        let previous = self.require(id)?.clone();

        let mut draft = draft;
        draft.id = Some(id);

        let current = self.materialize(draft, id).map_err(|errors| {
            warn!("Rejected update of device {}: {}", id, errors);
            TopologyError::Validation(errors)
        })?;

        self.unindex(&previous);
        self.insert(current.clone());
        debug!("Updated device {}", id);
        self.record(TopologyEvent::DeviceUpdated(DeviceUpdated {
            metadata: EventMetadata::now(),
            previous,
            current,
        }));

        Ok(())
    }

    /// Apply a change to a device's draft and re-validate it
    pub fn modify<F>(&mut self, id: DeviceId, change: F) -> TopologyResult<()>
    where
        F: FnOnce(&mut DeviceDraft),
    {
        let mut draft = self.require(id)?.to_draft();
        change(&mut draft);
        self.update(id, draft)
    }

    /// Back a device with an external resource
    pub fn attach_resource(&mut self, id: DeviceId, resource: ResourceRef) -> TopologyResult<()> {
        self.modify(id, |draft| draft.resource = Some(resource))
    }

    /// Drop a device's resource reference without touching the resource
    pub fn detach_resource(&mut self, id: DeviceId) -> TopologyResult<()> {
        self.modify(id, |draft| draft.resource = None)
    }

    pub fn set_factor(&mut self, id: DeviceId, factor: i32) -> TopologyResult<()> {
        self.modify(id, |draft| draft.factor = factor)
    }

    pub fn set_nodes(&mut self, id: DeviceId, nodes: u32) -> TopologyResult<()> {
        self.modify(id, |draft| draft.nodes = nodes)
    }

    /// Move a device under a new parent, or make it a root with `None`
    pub fn reparent(&mut self, id: DeviceId, parent: Option<DeviceId>) -> TopologyResult<()> {
        self.modify(id, |draft| draft.parent_id = parent)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require(&self, id: DeviceId) -> TopologyResult<&Device> {
        self.devices.get(&id).ok_or(TopologyError::DeviceNotFound(id))
    }

    fn insert(&mut self, device: Device) {
        if let Some(parent) = device.parent_id {
            self.children.entry(parent).or_default().insert(device.id);
        }
        if let Some(resource) = &device.resource {
            self.resource_holders.insert(resource.clone(), device.id);
        }
        self.devices.insert(device.id, device);
    }

    fn unindex(&mut self, device: &Device) {
        if let Some(parent) = device.parent_id {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.remove(&device.id);
                if siblings.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
        if let Some(resource) = &device.resource {
            if self.resource_holders.get(resource) == Some(&device.id) {
                self.resource_holders.remove(resource);
            }
        }
    }

    fn record(&mut self, event: TopologyEvent) {
        if self.config.record_events {
            self.events.push(event);
        }
    }
}
