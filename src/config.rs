// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::ClusterVersion;
use crate::errors::{TopologyError, TopologyResult};

/// What removal does when the device's resource cannot be idled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Skip resources the registry no longer knows; abort on any other failure
    #[default]
    IgnoreMissing,

    /// Log every failure and remove the device anyway
    BestEffort,

    /// Abort removal on any failure
    Strict,
}

impl fmt::Display for ReleasePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IgnoreMissing => "ignore_missing",
            Self::BestEffort => "best_effort",
            Self::Strict => "strict",
        };
        f.write_str(name)
    }
}

impl FromStr for ReleasePolicy {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ignore_missing" => Ok(Self::IgnoreMissing),
            "best_effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            other => Err(TopologyError::Configuration(format!(
                "Unknown release policy: {}",
                other
            ))),
        }
    }
}

/// Topology engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Oldest build line on which a root device may cluster
    #[serde(default)]
    pub min_cluster_version: ClusterVersion,

    /// Behaviour of the resource release step during removal
    #[serde(default)]
    pub release_policy: ReleasePolicy,

    /// Keep an in-memory log of topology events
    #[serde(default = "default_record_events")]
    pub record_events: bool,
}

fn default_record_events() -> bool {
    true
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            min_cluster_version: ClusterVersion::DEFAULT,
            release_policy: ReleasePolicy::default(),
            record_events: default_record_events(),
        }
    }
}

impl TopologyConfig {
    pub const ENV_MIN_CLUSTER_VERSION: &'static str = "TOPOLOGY_MIN_CLUSTER_VERSION";
    pub const ENV_RELEASE_POLICY: &'static str = "TOPOLOGY_RELEASE_POLICY";
    pub const ENV_RECORD_EVENTS: &'static str = "TOPOLOGY_RECORD_EVENTS";

    pub fn with_min_cluster_version(mut self, version: ClusterVersion) -> Self {
        self.min_cluster_version = version;
        self
    }

    pub fn with_release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.release_policy = policy;
        self
    }

    pub fn with_record_events(mut self, record: bool) -> Self {
        self.record_events = record;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> TopologyResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> TopologyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(version) = lookup(Self::ENV_MIN_CLUSTER_VERSION) {
            config.min_cluster_version = version.parse().map_err(|e| {
                TopologyError::Configuration(format!(
                    "{}: {}",
                    Self::ENV_MIN_CLUSTER_VERSION,
                    e
                ))
            })?;
        }

        if let Some(policy) = lookup(Self::ENV_RELEASE_POLICY) {
            config.release_policy = policy.parse()?;
        }

        if let Some(record) = lookup(Self::ENV_RECORD_EVENTS) {
            config.record_events = match record.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(TopologyError::Configuration(format!(
                        "{}: expected a boolean, got {}",
                        Self::ENV_RECORD_EVENTS,
                        other
                    )))
                }
            };
        }

        Ok(config)
    }
}
