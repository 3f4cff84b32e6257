// Copyright (c) 2025 - Cowboy AI, Inc.
//! Keying aggregation over one level of the hierarchy

use super::{Device, ResourceRef};
use crate::ports::ResourceRegistry;

/// Whether a device's resource is currently keying
///
/// A device with no resource, or whose resource cannot be looked up, is not
/// keying.
pub fn is_device_keying<R>(device: &Device, registry: &R) -> bool
where
    R: ResourceRegistry + ?Sized,
{
    device
        .resource
        .as_ref()
        .map(|resource: &ResourceRef| registry.is_keying(resource).unwrap_or(false))
        .unwrap_or(false)
}

/// Count the direct children whose resource is keying
///
/// Only the devices passed in are inspected; grandchildren are not visited.
pub fn keying_children_count<'a, I, R>(children: I, registry: &R) -> usize
where
    I: IntoIterator<Item = &'a Device>,
    R: ResourceRegistry + ?Sized,
{
    children
        .into_iter()
        .filter(|child| is_device_keying(child, registry))
        .count()
}
