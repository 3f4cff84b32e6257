// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Events
//!
//! Every successful write to a [`crate::topology::DeviceTopology`] is also
//! recorded as an immutable, past-tense event. Events carry a UUID v7 id, a
//! timestamp and a schema version so they can be shipped to an audit log or
//! replayed by downstream consumers.
//!
//! # Event Flow
//!
//! ```text
//! DeviceDraft → validation → DeviceTopology → TopologyEvent
//!  (intent)     (invariants)   (arena write)    (what happened)
//! ```
//!
//! A removal that idles a resource records `ResourceReleased` before
//! `DeviceRemoved`, matching the order in which the two effects happen.

pub mod topology;

pub use topology::{
    DeviceRegistered, DeviceRemoved, DeviceUpdated, EventMetadata, ResourceReleased,
    TopologyEvent, TOPOLOGY_EVENT_VERSION,
};
