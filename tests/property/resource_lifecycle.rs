// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Resource Lifecycle
//!
//! Arbitrary command sequences are applied to a resource; whatever happened
//! before, releasing a resource that is not disabled leaves it idle.

use cim_device_topology::domain::ResourceRef;
use cim_device_topology::ports::{InMemoryResourceRegistry, ResourceRegistry};
use cim_device_topology::state_machine::{ResourceCommand, StateMachine};
use cim_device_topology::ResourceState;
use proptest::prelude::*;

fn command() -> impl Strategy<Value = ResourceCommand> {
    prop_oneof![
        Just(ResourceCommand::Activate),
        Just(ResourceCommand::BeginKeying),
        Just(ResourceCommand::FinishKeying),
        Just(ResourceCommand::Release),
        Just(ResourceCommand::Disable),
        Just(ResourceCommand::Enable),
    ]
}

fn state() -> impl Strategy<Value = ResourceState> {
    prop_oneof![
        Just(ResourceState::Idle),
        Just(ResourceState::Active),
        Just(ResourceState::Keying),
        Just(ResourceState::Disabled),
    ]
}

proptest! {
    /// Property: valid_inputs lists exactly the commands that transition
    #[test]
    fn prop_valid_inputs_match_transitions(state in state(), input in command()) {
        let listed = state.valid_inputs().contains(&input);
        prop_assert_eq!(state.can_transition(&input), listed);
    }

    /// Property: History records one entry per accepted command
    #[test]
    fn prop_history_counts_accepted_commands(
        initial in state(),
        commands in prop::collection::vec(command(), 0..30),
    ) {
        let resource = ResourceRef::new("hsm-prop");
        let mut registry = InMemoryResourceRegistry::new();
        registry.insert(resource.clone(), initial);

        let accepted = commands
            .iter()
            .filter(|c| registry.apply(&resource, **c).is_ok())
            .count();

        let history = registry.history(&resource).map_or(0, |h| h.len());
        prop_assert_eq!(history, accepted);
    }

    /// Property: Releasing a non-disabled resource always ends idle
    #[test]
    fn prop_release_idles_non_disabled(
        initial in state(),
        commands in prop::collection::vec(command(), 0..30),
    ) {
        let resource = ResourceRef::new("hsm-prop");
        let mut registry = InMemoryResourceRegistry::new();
        registry.insert(resource.clone(), initial);
        for c in &commands {
            let _ = registry.apply(&resource, *c);
        }

        let before = registry.state(&resource).unwrap();
        let released = registry.transition_to_idle(&resource);

        if before.is_disabled() {
            prop_assert!(released.is_err());
            prop_assert_eq!(registry.state(&resource).unwrap(), ResourceState::Disabled);
        } else {
            prop_assert!(released.is_ok());
            prop_assert_eq!(registry.state(&resource).unwrap(), ResourceState::Idle);
        }
    }
}
