// Copyright (c) 2025 - Cowboy AI, Inc.
//! External Resource States
//!
//! A resource is the physical or virtual asset a device is backed by. Its
//! lifecycle is owned elsewhere; the topology only asks whether it is keying
//! or disabled, and asks for it to be idled when its device goes away.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an external resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    /// Available, not serving any role
    #[default]
    Idle,

    /// Serving its device
    Active,

    /// Participating in key exchange with its cluster
    Keying,

    /// Taken out of service; left alone by the topology
    Disabled,
}

impl ResourceState {
    pub fn is_keying(&self) -> bool {
        matches!(self, Self::Keying)
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Keying => "keying",
            Self::Disabled => "disabled",
        };
        f.write_str(name)
    }
}
