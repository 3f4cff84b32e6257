// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Lifecycle State Machine
//!
//! Formal FSM for the external resources devices are backed by.
//!
//! # State Machine Type
//!
//! This is a **Mealy Machine**: outputs depend on both state and input.
//!
//! # States
//!
//! - Idle: Available
//! - Active: Serving a device
//! - Keying: In key exchange with its cluster
//! - Disabled: Out of service
//!
//! # Inputs
//!
//! - Activate: Idle → Active
//! - BeginKeying: Idle | Active → Keying
//! - FinishKeying: Keying → Active
//! - Release: Idle | Active | Keying → Idle
//! - Disable: Idle | Active | Keying → Disabled
//! - Enable: Disabled → Idle

use super::{StateMachine, TransitionError, TransitionResult};
use crate::domain::ResourceState;

/// Resource command (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCommand {
    /// Put an idle resource into service
    Activate,

    /// Start key exchange
    BeginKeying,

    /// Key exchange completed
    FinishKeying,

    /// Return the resource to the idle pool
    Release,

    /// Take the resource out of service
    Disable,

    /// Bring a disabled resource back as idle
    Enable,
}

/// Transition output with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutput {
    /// Warnings generated during transition
    pub warnings: Vec<String>,

    /// Whether this transition interrupted work in progress
    pub is_critical: bool,
}

impl TransitionOutput {
    /// Create output with no warnings
    pub fn ok() -> Self {
        Self {
            warnings: Vec::new(),
            is_critical: false,
        }
    }

    /// Create output with warnings
    pub fn with_warnings(warnings: Vec<String>) -> Self {
        Self {
            warnings,
            is_critical: false,
        }
    }

    /// Create output for critical transition
    pub fn critical(warnings: Vec<String>) -> Self {
        Self {
            warnings,
            is_critical: true,
        }
    }
}

impl StateMachine for ResourceState {
    type Input = ResourceCommand;
    type Output = TransitionOutput;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use ResourceCommand::*;
        use ResourceState::*;

        match (self, input) {
            (Idle, Activate) => Ok((Active, TransitionOutput::ok())),
            (Idle | Active, BeginKeying) => Ok((Keying, TransitionOutput::ok())),
            (Keying, FinishKeying) => Ok((Active, TransitionOutput::ok())),

            (Idle, Release) => Ok((Idle, TransitionOutput::ok())),
            (Active, Release) => Ok((Idle, TransitionOutput::ok())),
            (Keying, Release) => Ok((
                Idle,
                TransitionOutput::critical(vec!["Key exchange interrupted".to_string()]),
            )),

            (Idle, Disable) => Ok((Disabled, TransitionOutput::ok())),
            (Active, Disable) => Ok((
                Disabled,
                TransitionOutput::with_warnings(vec!["Disabling active resource".to_string()]),
            )),
            (Keying, Disable) => Ok((
                Disabled,
                TransitionOutput::critical(vec![
                    "Disabling resource during key exchange".to_string()
                ]),
            )),
            (Disabled, Enable) => Ok((Idle, TransitionOutput::ok())),

            (Disabled, Disable) => Err(TransitionError::BusinessRuleViolation(
                "Already disabled".to_string(),
            )),
            (Disabled, _) => Err(TransitionError::InvalidTransition {
                from: self.to_string(),
                to: format!("{:?}", input),
            }),
            (_, Enable) => Err(TransitionError::PreconditionFailed(format!(
                "Only disabled resources can be enabled, resource is {}",
                self
            ))),
            (Active | Keying, Activate) => Err(TransitionError::BusinessRuleViolation(
                "Already in service".to_string(),
            )),
            (Keying, BeginKeying) => Err(TransitionError::BusinessRuleViolation(
                "Already keying".to_string(),
            )),
            (Idle | Active, FinishKeying) => Err(TransitionError::InvalidTransition {
                from: self.to_string(),
                to: "active (via FinishKeying)".to_string(),
            }),
        }
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        use ResourceCommand::*;
        use ResourceState::*;

        match self {
            Idle => vec![Activate, BeginKeying, Release, Disable],
            Active => vec![BeginKeying, Release, Disable],
            Keying => vec![FinishKeying, Release, Disable],
            Disabled => vec![Enable],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_from_keying_is_critical() {
        let (state, output) = ResourceState::Keying
            .transition(&ResourceCommand::Release)
            .expect("Transition should succeed");

        assert_eq!(state, ResourceState::Idle);
        assert!(output.is_critical);
        assert!(!output.warnings.is_empty());
    }

    #[test]
    fn test_release_is_idempotent_on_idle() {
        let (state, output) = ResourceState::Idle
            .transition(&ResourceCommand::Release)
            .expect("Transition should succeed");
        assert_eq!(state, ResourceState::Idle);
        assert_eq!(output, TransitionOutput::ok());
    }

    #[test]
    fn test_disabled_cannot_be_released() {
        let result = ResourceState::Disabled.transition(&ResourceCommand::Release);
        assert!(matches!(
            result.unwrap_err(),
            TransitionError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn test_keying_cycle() {
        let (state, _) = ResourceState::Idle
            .transition(&ResourceCommand::Activate)
            .unwrap();
        let (state, _) = state.transition(&ResourceCommand::BeginKeying).unwrap();
        assert!(state.is_keying());
        let (state, _) = state.transition(&ResourceCommand::FinishKeying).unwrap();
        assert_eq!(state, ResourceState::Active);
    }

    #[test]
    fn test_enable_only_from_disabled() {
        assert!(ResourceState::Active.transition(&ResourceCommand::Enable).is_err());
        let (state, _) = ResourceState::Disabled
            .transition(&ResourceCommand::Enable)
            .unwrap();
        assert_eq!(state, ResourceState::Idle);
    }

    #[test]
    fn test_valid_inputs_agree_with_transition() {
        let states = [
            ResourceState::Idle,
            ResourceState::Active,
            ResourceState::Keying,
            ResourceState::Disabled,
        ];
        let commands = [
            ResourceCommand::Activate,
            ResourceCommand::BeginKeying,
            ResourceCommand::FinishKeying,
            ResourceCommand::Release,
            ResourceCommand::Disable,
            ResourceCommand::Enable,
        ];

        for state in states {
            let valid = state.valid_inputs();
            for command in commands {
                assert_eq!(
                    state.can_transition(&command),
                    valid.contains(&command),
                    "{:?} with {:?}",
                    state,
                    command
                );
            }
        }
    }
}
