// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Device Invariants
//!
//! Every rule a device write must satisfy lives here as a pure function over
//! plain values. The topology gathers the facts these functions need (the
//! owning build, the current holder of a resource, the parent chain) and
//! accumulates every failure into one [`ValidationErrors`] collection, so a
//! caller sees all violated rules from a single attempt.
//!
//! # Rule Groups
//!
//! 1. **Presence**: device type, build and environment are required
//! 2. **Uniqueness**: a resource is held by at most one device
//! 3. **Clustering**: root devices with a positive factor need a clustering
//!    capable build and a node count divisible by the factor
//! 4. **Formatting**: IP address syntax and a genuine boolean FIPS flag
//! 5. **Hierarchy**: parents must exist and must not create cycles

use serde_json::Value;

use super::{Build, ClusterVersion, DeviceDraft, DeviceId, IpSyntaxValidator, ResourceRef};

/// Validation result for a single rule
pub type ValidationResult = Result<(), ValidationError>;

/// A single violated device rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required attribute was not supplied
    #[error("{field} is required")]
    RequiredFieldMissing { field: &'static str },

    /// Another device already holds this resource
    #[error("Resource {resource} is already assigned to device {holder}")]
    DuplicateResourceReference {
        resource: ResourceRef,
        holder: DeviceId,
    },

    /// Root device clusters on a build older than the clustering threshold
    #[error("Build version is too low for clustering: {version} (requires {required})")]
    ClusteringVersion {
        version: String,
        required: ClusterVersion,
    },

    /// Root device node count is not a multiple of its factor
    #[error("nodes is not equally divisible by factor: {nodes} % {factor} != 0")]
    ClusteringDivisibility { nodes: u32, factor: i32 },

    /// IP address failed the syntax check
    #[error("Incorrect IP formatting: {0}")]
    InvalidIpAddress(String),

    /// FIPS flag was not a boolean
    #[error("FIPS enabled flag invalid: {0}")]
    InvalidFipsFlag(String),

    /// The referenced build does not exist
    #[error("Build {0} does not exist")]
    UnknownBuild(super::BuildId),

    /// The referenced parent device does not exist
    #[error("Parent device {0} does not exist")]
    UnknownParent(DeviceId),

    /// The parent link would make a device its own ancestor
    #[error("Device {device} cannot be placed under {parent}: cycle in hierarchy")]
    ParentCycle { device: DeviceId, parent: DeviceId },
}

/// Every rule violated by one write attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} validation error(s): {}", .0.len(), join_errors(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Record the failure of a single-rule check, if any
    pub fn record(&mut self, result: ValidationResult) {
        if let Err(error) = result {
            self.0.push(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    /// Reject the write when anything was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Extend<ValidationError> for ValidationErrors {
    fn extend<T: IntoIterator<Item = ValidationError>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<T: IntoIterator<Item = ValidationError>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Validate the presence of required attributes
///
/// # Rules
/// - device type, build and environment must all be set
pub fn validate_required_fields(draft: &DeviceDraft) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if draft.device_type.is_none() {
        errors.push(ValidationError::RequiredFieldMissing {
            field: "device_type",
        });
    }
    if draft.build_id.is_none() {
        errors.push(ValidationError::RequiredFieldMissing { field: "build_id" });
    }
    if draft.environment_id.is_none() {
        errors.push(ValidationError::RequiredFieldMissing {
            field: "environment_id",
        });
    }

    errors
}

/// Validate clustering for a device against its build
///
/// # Rules
/// Applied only to root devices (no parent) with `factor > 0`:
/// - the build version must parse as `major.minor.patch` and reach `threshold`
/// - `nodes` must be a multiple of `factor`
///
/// Both rules are evaluated; a device can fail both at once.
pub fn validate_clustering(
    draft: &DeviceDraft,
    build: &Build,
    threshold: ClusterVersion,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if draft.parent_id.is_some() || draft.factor <= 0 {
        return errors;
    }

    let version_ok = build
        .parsed_version()
        .map(|version| version.meets(threshold))
        .unwrap_or(false);
    if !version_ok {
        errors.push(ValidationError::ClusteringVersion {
            version: build.version.clone(),
            required: threshold,
        });
    }

    if i64::from(draft.nodes) % i64::from(draft.factor) != 0 {
        errors.push(ValidationError::ClusteringDivisibility {
            nodes: draft.nodes,
            factor: draft.factor,
        });
    }

    errors
}

/// Validate the management IP address
///
/// # Rules
/// - absent addresses pass
/// - present addresses must satisfy the syntax validator
pub fn validate_ip_address<V>(ip_address: Option<&str>, validator: &V) -> ValidationResult
where
    V: IpSyntaxValidator + ?Sized,
{
    match ip_address {
        Some(ip) if !validator.is_valid(ip) => {
            Err(ValidationError::InvalidIpAddress(ip.to_string()))
        }
        _ => Ok(()),
    }
}

/// Resolve the raw FIPS flag to a boolean
///
/// Absent and `null` become `false`; booleans pass through; anything else is
/// rejected.
pub fn normalize_fips_flag(raw: Option<&Value>) -> Result<bool, ValidationError> {
    match raw {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(enabled)) => Ok(*enabled),
        Some(other) => Err(ValidationError::InvalidFipsFlag(other.to_string())),
    }
}

/// Validate that the FIPS flag resolves to a boolean
pub fn validate_fips_flag(raw: Option<&Value>) -> ValidationResult {
    normalize_fips_flag(raw).map(|_| ())
}

/// Validate that a resource is not held by another device
///
/// # Parameters
/// - `resource`: resource the draft wants to hold
/// - `holder`: device currently holding that resource, if any
/// - `device_id`: identity of the device being written, if already known
pub fn validate_resource_uniqueness(
    resource: Option<&ResourceRef>,
    holder: Option<DeviceId>,
    device_id: Option<DeviceId>,
) -> ValidationResult {
    match (resource, holder) {
        (Some(resource), Some(holder)) if Some(holder) != device_id => {
            Err(ValidationError::DuplicateResourceReference {
                resource: resource.clone(),
                holder,
            })
        }
        _ => Ok(()),
    }
}

/// Validate a parent link
///
/// # Parameters
/// - `device_id`: device being written, if already known
/// - `parent_id`: requested parent
/// - `parent_lineage`: the parent followed by its ancestors up to the root,
///   or `None` when the parent does not exist
pub fn validate_parent_link(
    device_id: Option<DeviceId>,
    parent_id: DeviceId,
    parent_lineage: Option<&[DeviceId]>,
) -> ValidationResult {
    let Some(lineage) = parent_lineage else {
        return Err(ValidationError::UnknownParent(parent_id));
    };

    if let Some(device) = device_id {
        if lineage.contains(&device) {
            return Err(ValidationError::ParentCycle {
                device,
                parent: parent_id,
            });
        }
    }

    Ok(())
}
