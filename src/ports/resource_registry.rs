// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource lifecycle capability

use chrono::Utc;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::domain::{ResourceRef, ResourceState};
use crate::state_machine::{
    ResourceCommand, StateMachineWithHistory, Transition, TransitionError, TransitionOutput,
};

/// Resource registry error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry has no such resource
    #[error("Resource not found: {0}")]
    NotFound(ResourceRef),

    /// The resource refused the requested transition
    #[error("Resource {resource} rejected transition: {source}")]
    Transition {
        resource: ResourceRef,
        #[source]
        source: TransitionError,
    },

    /// The registry could not be reached
    #[error("Resource registry unavailable: {0}")]
    Unavailable(String),
}

impl RegistryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Reads and idles external resources
pub trait ResourceRegistry {
    /// Current state of a resource
    fn state(&self, resource: &ResourceRef) -> RegistryResult<ResourceState>;

    /// Return a resource to the idle pool
    fn transition_to_idle(&mut self, resource: &ResourceRef) -> RegistryResult<TransitionOutput>;

    fn is_disabled(&self, resource: &ResourceRef) -> RegistryResult<bool> {
        self.state(resource).map(|state| state.is_disabled())
    }

    fn is_keying(&self, resource: &ResourceRef) -> RegistryResult<bool> {
        self.state(resource).map(|state| state.is_keying())
    }
}

/// Resource registry held in memory
///
/// Each resource is driven through the [`ResourceState`] state machine and
/// keeps its transition history.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceRegistry {
    resources: HashMap<ResourceRef, StateMachineWithHistory<ResourceState>>,
}

impl InMemoryResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource in the given state, replacing any previous entry
    pub fn insert(&mut self, resource: impl Into<ResourceRef>, state: ResourceState) {
        self.resources
            .insert(resource.into(), StateMachineWithHistory::new(state));
    }

    pub fn contains(&self, resource: &ResourceRef) -> bool {
        self.resources.contains_key(resource)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Apply a lifecycle command to a resource
    pub fn apply(
        &mut self,
        resource: &ResourceRef,
        command: ResourceCommand,
    ) -> RegistryResult<TransitionOutput> {
        let machine = self
            .resources
            .get_mut(resource)
            .ok_or_else(|| RegistryError::NotFound(resource.clone()))?;

        let output = machine
            .transition_with_history(command, Utc::now())
            .map_err(|source| RegistryError::Transition {
                resource: resource.clone(),
                source,
            })?;

        debug!(
            "Resource {} -> {} via {:?}",
            resource,
            machine.current_state(),
            command
        );
        Ok(output)
    }

    /// Transitions applied to a resource so far
    pub fn history(
        &self,
        resource: &ResourceRef,
    ) -> Option<&[Transition<ResourceState, ResourceCommand>]> {
        self.resources.get(resource).map(|m| m.get_history())
    }
}

impl ResourceRegistry for InMemoryResourceRegistry {
    fn state(&self, resource: &ResourceRef) -> RegistryResult<ResourceState> {
        self.resources
            .get(resource)
            .map(|machine| *machine.current_state())
            .ok_or_else(|| RegistryError::NotFound(resource.clone()))
    }

    fn transition_to_idle(&mut self, resource: &ResourceRef) -> RegistryResult<TransitionOutput> {
        self.apply(resource, ResourceCommand::Release)
    }
}
