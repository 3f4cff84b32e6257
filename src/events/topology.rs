// Copyright (c) 2025 - Cowboy AI, Inc.
//! Device Topology Events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Device, DeviceId, ResourceRef, ResourceState};

/// Current schema version of topology events
pub const TOPOLOGY_EVENT_VERSION: u32 = 1;

/// Facts recorded by successful topology writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TopologyEvent {
    /// A device passed validation and joined the topology
    DeviceRegistered(DeviceRegistered),

    /// A device was replaced by a re-validated version of itself
    DeviceUpdated(DeviceUpdated),

    /// A device left the topology
    DeviceRemoved(DeviceRemoved),

    /// A removed device's resource was handed back to the idle pool
    ResourceReleased(ResourceReleased),
}

/// Envelope fields shared by every topology event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_version: u32,

    /// Unique event identifier (UUID v7 for time ordering)
    pub event_id: Uuid,

    pub timestamp: DateTime<Utc>,
}

impl EventMetadata {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            event_version: TOPOLOGY_EVENT_VERSION,
            event_id: Uuid::now_v7(),
            timestamp,
        }
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistered {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub device: Device,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUpdated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub previous: Device,

    pub current: Device,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRemoved {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub device: Device,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReleased {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub device_id: DeviceId,

    pub resource: ResourceRef,

    /// State the resource was in before it was idled
    pub previous_state: ResourceState,

    /// Warnings raised by the resource lifecycle
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

impl TopologyEvent {
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            Self::DeviceRegistered(e) => &e.metadata,
            Self::DeviceUpdated(e) => &e.metadata,
            Self::DeviceRemoved(e) => &e.metadata,
            Self::ResourceReleased(e) => &e.metadata,
        }
    }

    /// Device the event is about
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::DeviceRegistered(e) => e.device.id,
            Self::DeviceUpdated(e) => e.current.id,
            Self::DeviceRemoved(e) => e.device.id,
            Self::ResourceReleased(e) => e.device_id,
        }
    }

    pub fn event_type_name(&self) -> &'static str {
        match self {
            Self::DeviceRegistered(_) => "DeviceRegistered",
            Self::DeviceUpdated(_) => "DeviceUpdated",
            Self::DeviceRemoved(_) => "DeviceRemoved",
            Self::ResourceReleased(_) => "ResourceReleased",
        }
    }
}
