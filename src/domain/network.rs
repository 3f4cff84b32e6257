// Copyright (c) 2025 - Cowboy AI, Inc.
//! Device Network Addressing
//!
//! IP syntax checking is a capability the engine consumes rather than owns.
//! [`IpSyntaxValidator`] is that seam; [`StdIpSyntaxValidator`] is the default
//! adapter over the standard library address parser.

use std::net::IpAddr;
use std::str::FromStr;

/// Capability that decides whether a string is a well-formed IP address
pub trait IpSyntaxValidator {
    /// Returns true for syntactically valid IPv4 or IPv6 addresses
    fn is_valid(&self, candidate: &str) -> bool;
}

/// Validator backed by [`std::net::IpAddr`] parsing
///
/// Accepts bare addresses only; CIDR suffixes and surrounding whitespace are
/// rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdIpSyntaxValidator;

impl IpSyntaxValidator for StdIpSyntaxValidator {
    fn is_valid(&self, candidate: &str) -> bool {
        IpAddr::from_str(candidate).is_ok()
    }
}

impl<F> IpSyntaxValidator for F
where
    F: Fn(&str) -> bool,
{
    fn is_valid(&self, candidate: &str) -> bool {
        self(candidate)
    }
}
