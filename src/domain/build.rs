// Copyright (c) 2025 - Cowboy AI, Inc.
//! Build Records and Version Gating

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::BuildId;

/// Build version parse error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Version must have the form major.minor.patch: {0}")]
    Malformed(String),

    #[error("Invalid version component '{component}' in {version}")]
    InvalidComponent { version: String, component: String },
}

/// Software build a device runs
///
/// Owned outside this crate; only the version string matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    pub version: String,
}

impl Build {
    pub fn new(id: BuildId, version: impl Into<String>) -> Self {
        Self {
            id,
            version: version.into(),
        }
    }

    /// Parse the version string
    pub fn parsed_version(&self) -> Result<BuildVersion, VersionError> {
        self.version.parse()
    }
}

/// Three-component build version
///
/// Ordering is lexicographic over (major, minor, patch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl BuildVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether this build is at or above a clustering threshold
    ///
    /// Only major and minor take part in the comparison.
    pub fn meets(&self, threshold: ClusterVersion) -> bool {
        (self.major, self.minor) >= (threshold.major, threshold.minor)
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for BuildVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::Malformed(s.to_string()));
        }

        let component = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| VersionError::InvalidComponent {
                    version: s.to_string(),
                    component: part.to_string(),
                })
        };

        Ok(Self {
            major: component(parts[0])?,
            minor: component(parts[1])?,
            patch: component(parts[2])?,
        })
    }
}

/// Minimum (major, minor) a build needs before a root device may cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterVersion {
    pub major: u32,
    pub minor: u32,
}

impl ClusterVersion {
    /// First release line that supports clustering
    pub const DEFAULT: ClusterVersion = ClusterVersion {
        major: 10,
        minor: 1,
    };

    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for ClusterVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ClusterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ClusterVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| VersionError::Malformed(s.to_string()))?;

        let component = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| VersionError::InvalidComponent {
                    version: s.to_string(),
                    component: part.to_string(),
                })
        };

        Ok(Self {
            major: component(major)?,
            minor: component(minor)?,
        })
    }
}
