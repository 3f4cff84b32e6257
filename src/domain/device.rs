// Copyright (c) 2025 - Cowboy AI, Inc.
//! Environment Device Entity
//!
//! A device is one node of an environment's cluster topology. Devices form a
//! tree through `parent_id`; only the root of a tree carries the clustering
//! configuration (`nodes` / `factor`) that the invariants check.
//!
//! Writes arrive as a [`DeviceDraft`], the unvalidated form in which every
//! required field is still optional and the FIPS flag is whatever raw JSON
//! value the caller supplied. The validation pipeline in
//! [`crate::domain::invariants`] turns a draft into a [`Device`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when parsing identifiers or enum names from strings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceParseError {
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Unknown device type: {0}")]
    UnknownDeviceType(String),

    #[error("Unknown host type: {0}")]
    UnknownHostType(String),
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new time-ordered identifier
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = DeviceParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| DeviceParseError::InvalidId(s.to_string()))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Identity of an environment device
    DeviceId
);

uuid_id!(
    /// Reference to the build a device runs
    BuildId
);

uuid_id!(
    /// Reference to the environment a device belongs to
    EnvironmentId
);

/// Reference to an externally-owned physical or virtual resource
///
/// At most one device may hold a given reference at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRef(String);

impl ResourceRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceRef {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

/// Role a device plays in the environment
///
/// Discriminants match the stored integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Esm = 0,
    Rec = 1,
    Elm = 2,
    Adm = 3,
    Dem = 4,
    Ace = 5,
    Esmcombo = 6,
    Recelm = 7,
    Els = 8,
}

impl DeviceType {
    /// All device types in code order
    pub const ALL: [DeviceType; 9] = [
        Self::Esm,
        Self::Rec,
        Self::Elm,
        Self::Adm,
        Self::Dem,
        Self::Ace,
        Self::Esmcombo,
        Self::Recelm,
        Self::Els,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Esm => "esm",
            Self::Rec => "rec",
            Self::Elm => "elm",
            Self::Adm => "adm",
            Self::Dem => "dem",
            Self::Ace => "ace",
            Self::Esmcombo => "esmcombo",
            Self::Recelm => "recelm",
            Self::Els => "els",
        }
    }

    /// Stored integer code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Look up a device type by its stored integer code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Combination appliances host more than one role
    pub fn is_combo(&self) -> bool {
        matches!(self, Self::Esmcombo | Self::Recelm)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = DeviceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DeviceParseError::UnknownDeviceType(s.to_string()))
    }
}

/// How the device is hosted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostType {
    #[default]
    Hardware = 0,
    #[serde(alias = "virtual-machine", alias = "vm")]
    VirtualMachine = 1,
}

impl HostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::VirtualMachine => "virtual_machine",
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, Self::VirtualMachine)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostType {
    type Err = DeviceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hardware" => Ok(Self::Hardware),
            "virtual_machine" | "virtual-machine" | "vm" => Ok(Self::VirtualMachine),
            _ => Err(DeviceParseError::UnknownHostType(s.to_string())),
        }
    }
}

/// Validated environment device
///
/// # Invariants
/// - `device_type`, `build_id` and `environment_id` are always present
/// - `resource`, when set, is held by no other device
/// - a root device with `factor > 0` runs a clustering-capable build and
///   `nodes` is a multiple of `factor`
/// - `ip_address`, when set, is a well-formed IPv4/IPv6 address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,

    pub device_type: DeviceType,

    #[serde(default)]
    pub host_type: HostType,

    pub build_id: BuildId,

    pub environment_id: EnvironmentId,

    /// Externally-owned resource backing this device
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resource: Option<ResourceRef>,

    /// Parent device; `None` for the root of a cluster
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<DeviceId>,

    /// Participating node count, supplied at provisioning time and never stored
    #[serde(skip_serializing, default)]
    pub nodes: u32,

    /// Clustering factor
    #[serde(default)]
    pub factor: i32,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ip_address: Option<String>,

    #[serde(default)]
    pub fips_enabled: bool,
}

impl Device {
    /// A device with no parent heads its own cluster
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the clustering invariants apply to this device
    pub fn enforces_clustering(&self) -> bool {
        self.is_root() && self.factor > 0
    }

    /// Convert back into a draft, e.g. to apply a change and re-validate
    pub fn to_draft(&self) -> DeviceDraft {
        DeviceDraft {
            id: Some(self.id),
            device_type: Some(self.device_type),
            host_type: self.host_type,
            build_id: Some(self.build_id),
            environment_id: Some(self.environment_id),
            resource: self.resource.clone(),
            parent_id: self.parent_id,
            nodes: self.nodes,
            factor: self.factor,
            ip_address: self.ip_address.clone(),
            fips_enabled: Some(serde_json::Value::Bool(self.fips_enabled)),
        }
    }
}

/// Unvalidated device attributes as submitted by a caller
///
/// `fips_enabled` is kept as raw JSON so that non-boolean input can be
/// reported instead of silently coerced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceDraft {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<DeviceId>,

    #[serde(default)]
    pub device_type: Option<DeviceType>,

    #[serde(default)]
    pub host_type: HostType,

    #[serde(default)]
    pub build_id: Option<BuildId>,

    #[serde(default)]
    pub environment_id: Option<EnvironmentId>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resource: Option<ResourceRef>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<DeviceId>,

    #[serde(default)]
    pub nodes: u32,

    #[serde(default)]
    pub factor: i32,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ip_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fips_enabled: Option<serde_json::Value>,
}

impl DeviceDraft {
    /// Start a draft with the three required attributes filled in
    pub fn new(device_type: DeviceType, build_id: BuildId, environment_id: EnvironmentId) -> Self {
        Self {
            device_type: Some(device_type),
            build_id: Some(build_id),
            environment_id: Some(environment_id),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn host_type(mut self, host_type: HostType) -> Self {
        self.host_type = host_type;
        self
    }

    pub fn resource(mut self, resource: impl Into<ResourceRef>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn parent(mut self, parent_id: DeviceId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn clustering(mut self, nodes: u32, factor: i32) -> Self {
        self.nodes = nodes;
        self.factor = factor;
        self
    }

    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    pub fn fips_enabled(mut self, enabled: bool) -> Self {
        self.fips_enabled = Some(serde_json::Value::Bool(enabled));
        self
    }

    /// Set the FIPS flag from an arbitrary JSON value
    pub fn fips_raw(mut self, value: serde_json::Value) -> Self {
        self.fips_enabled = Some(value);
        self
    }
}
