// Copyright (c) 2025 - Cowboy AI, Inc.
//! Device removal and the resource release hook

use tracing::{debug, info, warn};

use super::DeviceTopology;
use crate::config::ReleasePolicy;
use crate::domain::{Device, DeviceId, IpSyntaxValidator, ResourceRef, ResourceState};
use crate::errors::{TopologyError, TopologyResult};
use crate::events::{DeviceRemoved, EventMetadata, ResourceReleased, TopologyEvent};
use crate::ports::{BuildCatalog, RegistryError, ResourceRegistry};

/// What the release hook did with a device's resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The device had no resource
    NoResource,

    /// The resource was disabled and left alone
    AlreadyDisabled(ResourceRef),

    /// The resource was returned to idle
    Released {
        resource: ResourceRef,
        previous_state: ResourceState,
        warnings: Vec<String>,
    },

    /// The registry no longer knows the resource
    Missing(ResourceRef),

    /// Release failed and the policy allowed removal to continue
    Failed {
        resource: ResourceRef,
        error: RegistryError,
    },
}

impl ReleaseOutcome {
    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released { .. })
    }
}

/// Result of removing a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// The device as it was when removed
    pub device: Device,

    pub release: ReleaseOutcome,
}

impl<B, R, V> DeviceTopology<B, R, V>
where
    B: BuildCatalog,
    R: ResourceRegistry,
    V: IpSyntaxValidator,
{
    /// Remove a device from the topology
    ///
    /// The device's resource is released first; if the release policy turns
    /// a release failure into an error the device stays in place. Devices
    /// that still have children cannot be removed.
    pub fn remove(&mut self, id: DeviceId) -> TopologyResult<RemovalOutcome> {
        let device = self.require(id)?.clone();

        let children = self.children.get(&id).map_or(0, |set| set.len());
        if children > 0 {
            return Err(TopologyError::HasChildren {
                device: id,
                children,
            });
        }

        let release = self.release_resource_on_removal(&device)?;

        self.unindex(&device);
        self.devices.remove(&id);
        info!("Removed {} device {}", device.device_type, id);

        self.record(TopologyEvent::DeviceRemoved(DeviceRemoved {
            metadata: EventMetadata::now(),
            device: device.clone(),
        }));

        Ok(RemovalOutcome { device, release })
    }

    /// Return a device's resource to the idle pool ahead of its removal
    ///
    /// Disabled resources and devices without a resource are left alone.
    /// Failures are handled according to the configured [`ReleasePolicy`].
    pub fn release_resource_on_removal(
        &mut self,
        device: &Device,
    ) -> TopologyResult<ReleaseOutcome> {
        let Some(resource) = device.resource.clone() else {
            return Ok(ReleaseOutcome::NoResource);
        };

        let attempt = self.resources.state(&resource).and_then(|state| {
            if state.is_disabled() {
                return Ok(None);
            }
            self.resources
                .transition_to_idle(&resource)
                .map(|output| Some((state, output.warnings)))
        });

        match attempt {
            Ok(None) => {
                debug!(
                    "Resource {} of device {} is disabled, leaving it alone",
                    resource, device.id
                );
                Ok(ReleaseOutcome::AlreadyDisabled(resource))
            }
            Ok(Some((previous_state, warnings))) => {
                info!(
                    "Released resource {} of device {} ({} -> idle)",
                    resource, device.id, previous_state
                );
                self.record(TopologyEvent::ResourceReleased(ResourceReleased {
                    metadata: EventMetadata::now(),
                    device_id: device.id,
                    resource: resource.clone(),
                    previous_state,
                    warnings: warnings.clone(),
                }));
                Ok(ReleaseOutcome::Released {
                    resource,
                    previous_state,
                    warnings,
                })
            }
            Err(error) => self.handle_release_failure(device.id, resource, error),
        }
    }

    fn handle_release_failure(
        &self,
        device: DeviceId,
        resource: ResourceRef,
        error: RegistryError,
    ) -> TopologyResult<ReleaseOutcome> {
        match (self.config.release_policy, error.is_not_found()) {
            (ReleasePolicy::IgnoreMissing | ReleasePolicy::BestEffort, true) => {
                warn!(
                    "Resource {} of device {} is unknown to the registry, skipping release",
                    resource, device
                );
                Ok(ReleaseOutcome::Missing(resource))
            }
            (ReleasePolicy::BestEffort, false) => {
                warn!(
                    "Failed to release resource {} of device {}, removing anyway: {}",
                    resource, device, error
                );
                Ok(ReleaseOutcome::Failed { resource, error })
            }
            (ReleasePolicy::IgnoreMissing | ReleasePolicy::Strict, _) => {
                warn!(
                    "Failed to release resource {} of device {}, keeping device: {}",
                    resource, device, error
                );
                Err(TopologyError::ResourceRelease {
                    device,
                    source: error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologyConfig;
    use crate::domain::{BuildId, DeviceDraft, DeviceType, EnvironmentId};
    use crate::ports::{InMemoryBuildCatalog, InMemoryResourceRegistry};
    use crate::state_machine::TransitionOutput;

    /// Registry whose backend is unreachable
    struct OfflineRegistry;

    impl ResourceRegistry for OfflineRegistry {
        fn state(&self, _resource: &ResourceRef) -> Result<ResourceState, RegistryError> {
            Err(RegistryError::Unavailable("connection refused".to_string()))
        }

        fn transition_to_idle(
            &mut self,
            _resource: &ResourceRef,
        ) -> Result<TransitionOutput, RegistryError> {
            Err(RegistryError::Unavailable("connection refused".to_string()))
        }
    }

    fn catalog() -> (InMemoryBuildCatalog, BuildId) {
        let mut builds = InMemoryBuildCatalog::new();
        let id = builds.add_version("10.1.0");
        (builds, id)
    }

    fn rec_draft(build: BuildId, resource: &str) -> DeviceDraft {
        DeviceDraft::new(DeviceType::Rec, build, EnvironmentId::new()).resource(resource)
    }

    fn registry() -> InMemoryResourceRegistry {
        let mut resources = InMemoryResourceRegistry::new();
        resources.insert("keying", ResourceState::Keying);
        resources.insert("disabled", ResourceState::Disabled);
        resources
    }

    #[test]
    fn test_remove_idles_keying_resource() {
        let (builds, build) = catalog();
        let mut topology = DeviceTopology::new(builds, registry());
        let id = topology
            .register(rec_draft(build, "keying"))
            .unwrap();

        let outcome = topology.remove(id).unwrap();
        assert!(outcome.release.is_released());
        assert!(!topology.contains(id));
        assert_eq!(
            topology.resources().state(&ResourceRef::new("keying")),
            Ok(ResourceState::Idle)
        );
        assert!(topology
            .device_for_resource(&ResourceRef::new("keying"))
            .is_none());

        let names: Vec<_> = topology.events().iter().map(|e| e.event_type_name()).collect();
        assert_eq!(names, vec!["DeviceRegistered", "ResourceReleased", "DeviceRemoved"]);
    }

    #[test]
    fn test_remove_leaves_disabled_resource() {
        let (builds, build) = catalog();
        let mut topology = DeviceTopology::new(builds, registry());
        let id = topology
            .register(rec_draft(build, "disabled"))
            .unwrap();

        let outcome = topology.remove(id).unwrap();
        assert_eq!(
            outcome.release,
            ReleaseOutcome::AlreadyDisabled(ResourceRef::new("disabled"))
        );
        assert_eq!(
            topology.resources().state(&ResourceRef::new("disabled")),
            Ok(ResourceState::Disabled)
        );
        assert!(topology
            .resources()
            .history(&ResourceRef::new("disabled"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_remove_without_resource() {
        let (builds, build) = catalog();
        let mut topology = DeviceTopology::new(builds, registry());
        let id = topology
            .register(DeviceDraft::new(DeviceType::Esm, build, EnvironmentId::new()))
            .unwrap();

        assert_eq!(topology.remove(id).unwrap().release, ReleaseOutcome::NoResource);
        assert!(matches!(
            topology.remove(id),
            Err(TopologyError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_remove_refuses_devices_with_children() {
        let (builds, build) = catalog();
        let env = EnvironmentId::new();
        let mut topology = DeviceTopology::new(builds, registry());
        let root = topology
            .register(DeviceDraft::new(DeviceType::Esm, build, env))
            .unwrap();
        let child = topology
            .register(DeviceDraft::new(DeviceType::Rec, build, env).parent(root))
            .unwrap();

        assert!(matches!(
            topology.remove(root),
            Err(TopologyError::HasChildren { children: 1, .. })
        ));
        topology.remove(child).unwrap();
        topology.remove(root).unwrap();
        assert!(topology.is_empty());
    }

    #[test]
    fn test_missing_resource_skipped_by_default() {
        let (builds, build) = catalog();
        let mut topology = DeviceTopology::new(builds, InMemoryResourceRegistry::new());
        let id = topology
            .register(rec_draft(build, "gone"))
            .unwrap();

        let outcome = topology.remove(id).unwrap();
        assert_eq!(outcome.release, ReleaseOutcome::Missing(ResourceRef::new("gone")));
    }

    #[test]
    fn test_missing_resource_blocks_strict_removal() {
        let (builds, build) = catalog();
        let config = TopologyConfig::default().with_release_policy(ReleasePolicy::Strict);
        let mut topology =
            DeviceTopology::with_config(config, builds, InMemoryResourceRegistry::new());
        let id = topology
            .register(rec_draft(build, "gone"))
            .unwrap();

        assert!(matches!(
            topology.remove(id),
            Err(TopologyError::ResourceRelease { .. })
        ));
        assert!(topology.contains(id));
    }

    #[test]
    fn test_unavailable_registry_blocks_default_removal() {
        let (builds, build) = catalog();
        let mut topology = DeviceTopology::new(builds, OfflineRegistry);
        let id = topology
            .register(rec_draft(build, "hsm"))
            .unwrap();

        assert!(topology.remove(id).is_err());
        assert!(topology.contains(id));
        assert!(topology
            .device_for_resource(&ResourceRef::new("hsm"))
            .is_some());
    }

    #[test]
    fn test_best_effort_removes_despite_failure() {
        let (builds, build) = catalog();
        let config = TopologyConfig::default().with_release_policy(ReleasePolicy::BestEffort);
        let mut topology = DeviceTopology::with_config(config, builds, OfflineRegistry);
        let id = topology
            .register(rec_draft(build, "hsm"))
            .unwrap();

        let outcome = topology.remove(id).unwrap();
        assert!(matches!(outcome.release, ReleaseOutcome::Failed { .. }));
        assert!(!topology.contains(id));
    }
}
