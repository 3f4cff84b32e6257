// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for topology operations

use thiserror::Error;

use crate::domain::{DeviceId, ValidationErrors};
use crate::ports::RegistryError;

/// Errors that can occur in topology operations
#[derive(Debug, Error)]
pub enum TopologyError {
    /// No device with this id
    #[error("Device not found: {0}")]
    DeviceNotFound(DeviceId),

    /// A device with this id is already registered
    #[error("Device already registered: {0}")]
    DuplicateDevice(DeviceId),

    /// The write violated one or more device rules
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Devices cannot be removed while other devices hang below them
    #[error("Device {device} still has {children} child device(s)")]
    HasChildren { device: DeviceId, children: usize },

    /// Releasing the device's resource failed and the release policy forbids
    /// continuing
    #[error("Failed to release resource of device {device}: {source}")]
    ResourceRelease {
        device: DeviceId,
        #[source]
        source: RegistryError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Snapshot could not be loaded
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TopologyError {
    /// Validation failures carried by this error, if any
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        TopologyError::Serialization(err.to_string())
    }
}
