// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties of the device rules that must hold for every input, not just
//! the hand-picked cases in the integration tests.

mod clustering;
mod resource_lifecycle;
