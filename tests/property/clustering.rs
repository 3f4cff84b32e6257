// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Clustering Rules
//!
//! The clustering rule applies only to root devices with a positive factor.
//! For those it fails on an old build line, on an indivisible node count, or
//! on both at once; for every other device it never fails.

use cim_device_topology::domain::invariants::validate_clustering;
use cim_device_topology::domain::{BuildId, DeviceDraft, DeviceId, DeviceType, EnvironmentId};
use cim_device_topology::{Build, ClusterVersion, ValidationError};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Well-formed `major.minor.patch` versions around the clustering threshold
fn build_version() -> impl Strategy<Value = (u32, u32, u32)> {
    (8u32..13, 0u32..4, 0u32..20)
}

/// Version strings that do not parse as `major.minor.patch`
fn malformed_version() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("latest".to_string()),
        Just("10.1".to_string()),
        Just("10.1.0.4".to_string()),
        Just(String::new()),
        "[a-z]{1,8}",
    ]
}

fn root_draft(nodes: u32, factor: i32) -> DeviceDraft {
    DeviceDraft::new(DeviceType::Esm, BuildId::new(), EnvironmentId::new())
        .clustering(nodes, factor)
}

fn build(version: impl Into<String>) -> Build {
    Build::new(BuildId::new(), version)
}

/// Clustering errors against the default threshold
fn clustering_errors(draft: &DeviceDraft, version: impl Into<String>) -> Vec<ValidationError> {
    validate_clustering(draft, &build(version), ClusterVersion::DEFAULT)
}

fn has_version_error(errors: &[ValidationError]) -> bool {
    errors
        .iter()
        .any(|e| matches!(e, ValidationError::ClusteringVersion { .. }))
}

fn has_divisibility_error(errors: &[ValidationError]) -> bool {
    errors
        .iter()
        .any(|e| matches!(e, ValidationError::ClusteringDivisibility { .. }))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Roots without a positive factor never fail clustering
    #[test]
    fn prop_non_positive_factor_always_passes(
        nodes in any::<u32>(),
        factor in i32::MIN..=0,
        version in ".*",
    ) {
        let errors = clustering_errors(&root_draft(nodes, factor), version);
        prop_assert!(errors.is_empty());
    }

    /// Property: Child devices never fail clustering
    #[test]
    fn prop_children_always_pass(
        nodes in any::<u32>(),
        factor in any::<i32>(),
        version in ".*",
    ) {
        let draft = root_draft(nodes, factor).parent(DeviceId::new());
        let errors = clustering_errors(&draft, version);
        prop_assert!(errors.is_empty());
    }

    /// Property: A clustering root passes exactly when its build reaches
    /// the threshold and its nodes divide evenly by its factor
    #[test]
    fn prop_root_passes_iff_version_and_divisibility_hold(
        (major, minor, patch) in build_version(),
        nodes in 0u32..1000,
        factor in 1i32..50,
    ) {
        let version = format!("{}.{}.{}", major, minor, patch);
        let errors = clustering_errors(&root_draft(nodes, factor), version);

        let version_ok = (major, minor) >= (10, 1);
        let divisible = nodes % factor as u32 == 0;

        prop_assert_eq!(has_version_error(&errors), !version_ok);
        prop_assert_eq!(has_divisibility_error(&errors), !divisible);
        prop_assert_eq!(errors.is_empty(), version_ok && divisible);
    }

    /// Property: Multiples of the factor are always divisible
    #[test]
    fn prop_multiples_of_factor_pass_divisibility(
        clusters in 0u32..100,
        factor in 1i32..100,
    ) {
        let nodes = clusters * factor as u32;
        let errors = clustering_errors(&root_draft(nodes, factor), "10.1.0");
        prop_assert!(errors.is_empty());
    }

    /// Property: Unparsable versions always fail the version check
    #[test]
    fn prop_malformed_version_fails_version_check(
        version in malformed_version(),
        factor in 1i32..10,
    ) {
        let nodes = factor as u32 * 2;
        let errors = clustering_errors(&root_draft(nodes, factor), version);
        prop_assert!(has_version_error(&errors));
        prop_assert!(!has_divisibility_error(&errors));
    }

    /// Property: Raising the threshold never accepts a build it rejected before
    #[test]
    fn prop_higher_threshold_is_stricter(
        (major, minor, patch) in build_version(),
        bump in 0u32..3,
    ) {
        let version = format!("{}.{}.{}", major, minor, patch);
        let stricter = ClusterVersion::new(10, 1 + bump);
        let draft = root_draft(4, 2);

        let at_default = clustering_errors(&draft, version.clone());
        let at_stricter = validate_clustering(&draft, &build(version), stricter);
        prop_assert!(!has_version_error(&at_default) || has_version_error(&at_stricter));
    }
}
