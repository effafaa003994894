//! Consistency checks over metadata tables.
//!
//! Every rule runs and every violation is collected, so a loader sees all
//! problems with a controller description in one pass.

use super::error::MetadataViolation;
use super::ControllerMetadata;
use crate::core::{StateId, TransitionInfo};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Result of validating metadata: success, or every violation found.
pub type MetadataValidation = Validation<(), NonEmptyVec<MetadataViolation>>;

impl ControllerMetadata {
    /// Check the tables against a machine with `layer_count` layers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use animwatch::core::{StateId, StateInfo};
    /// use animwatch::metadata::ControllerMetadata;
    ///
    /// let mut metadata = ControllerMetadata::new();
    /// metadata.insert_state(StateInfo::new(StateId(1), "Idle", 0, "Base Layer"));
    ///
    /// assert!(metadata.validate(1).is_success());
    /// assert!(metadata.validate(0).is_failure());
    /// ```
    pub fn validate(&self, layer_count: usize) -> MetadataValidation {
        let mut checks: Vec<Validation<(), NonEmptyVec<MetadataViolation>>> = Vec::new();

        let mut states: Vec<_> = self.states().collect();
        states.sort_by_key(|s| s.id);
        for state in states {
            checks.push(if state.id.is_none() {
                Validation::fail(MetadataViolation::ReservedStateId {
                    name: state.name.clone(),
                })
            } else {
                Validation::success(())
            });

            checks.push(if state.layer >= layer_count {
                Validation::fail(MetadataViolation::StateLayerOutOfRange {
                    id: state.id,
                    layer: state.layer,
                    layer_count,
                })
            } else {
                Validation::success(())
            });
        }

        let mut transitions: Vec<_> = self.transitions().collect();
        transitions.sort_by_key(|t| t.id);
        for transition in transitions {
            checks.push(if transition.id.is_none() {
                Validation::fail(MetadataViolation::ReservedTransitionId {
                    name: transition.name.clone(),
                })
            } else {
                Validation::success(())
            });

            checks.push(if transition.layer >= layer_count {
                Validation::fail(MetadataViolation::TransitionLayerOutOfRange {
                    id: transition.id,
                    layer: transition.layer,
                    layer_count,
                })
            } else {
                Validation::success(())
            });

            checks.push(self.check_endpoint(transition, transition.source));
            checks.push(self.check_endpoint(transition, transition.dest));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    fn check_endpoint(
        &self,
        transition: &TransitionInfo,
        endpoint: StateId,
    ) -> Validation<(), NonEmptyVec<MetadataViolation>> {
        match self.state(endpoint) {
            None => Validation::fail(MetadataViolation::UnknownEndpoint {
                id: transition.id,
                state: endpoint,
            }),
            Some(state) if state.layer != transition.layer => {
                Validation::fail(MetadataViolation::CrossLayerEndpoint {
                    id: transition.id,
                    layer: transition.layer,
                    state: endpoint,
                    state_layer: state.layer,
                })
            }
            Some(_) => Validation::success(()),
        }
    }
}

/// Flatten a validation outcome into the list of violations it carries.
pub fn violations(result: MetadataValidation) -> Vec<MetadataViolation> {
    match result {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StateInfo, TransitionId};

    fn base_states() -> Vec<StateInfo> {
        vec![
            StateInfo::new(StateId(1), "Idle", 0, "Base Layer"),
            StateInfo::new(StateId(2), "Walk", 0, "Base Layer"),
            StateInfo::new(StateId(3), "Wave", 1, "Upper"),
        ]
    }

    #[test]
    fn consistent_metadata_passes() {
        let metadata = ControllerMetadata::from_parts(
            base_states(),
            vec![TransitionInfo::new(
                TransitionId(12),
                "Idle -> Walk",
                0,
                "Base Layer",
                StateId(1),
                StateId(2),
            )],
        );

        assert!(metadata.validate(2).is_success());
        assert!(violations(metadata.validate(2)).is_empty());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let mut states = base_states();
        states.push(StateInfo::new(StateId::NONE, "Ghost", 0, "Base Layer"));

        let metadata = ControllerMetadata::from_parts(
            states,
            vec![
                TransitionInfo::new(
                    TransitionId(20),
                    "Idle -> Missing",
                    0,
                    "Base Layer",
                    StateId(1),
                    StateId(77),
                ),
                TransitionInfo::new(
                    TransitionId(21),
                    "Idle -> Wave",
                    0,
                    "Base Layer",
                    StateId(1),
                    StateId(3),
                ),
            ],
        );

        let result = metadata.validate(1);
        assert!(result.is_failure());

        let found = violations(result);
        assert_eq!(found.len(), 4);
        assert!(found
            .iter()
            .any(|v| matches!(v, MetadataViolation::ReservedStateId { .. })));
        assert!(found.iter().any(|v| matches!(
            v,
            MetadataViolation::StateLayerOutOfRange { id: StateId(3), .. }
        )));
        assert!(found.iter().any(|v| matches!(
            v,
            MetadataViolation::UnknownEndpoint {
                state: StateId(77),
                ..
            }
        )));
        assert!(found.iter().any(|v| matches!(
            v,
            MetadataViolation::CrossLayerEndpoint {
                state: StateId(3),
                state_layer: 1,
                ..
            }
        )));
    }

    #[test]
    fn transition_layer_out_of_range() {
        let metadata = ControllerMetadata::from_parts(
            vec![
                StateInfo::new(StateId(5), "A", 2, "Extra"),
                StateInfo::new(StateId(6), "B", 2, "Extra"),
            ],
            vec![TransitionInfo::new(
                TransitionId(56),
                "A -> B",
                2,
                "Extra",
                StateId(5),
                StateId(6),
            )],
        );

        let found = violations(metadata.validate(2));
        assert_eq!(found.len(), 3);
        assert!(found.iter().any(|v| matches!(
            v,
            MetadataViolation::TransitionLayerOutOfRange { layer: 2, .. }
        )));
    }

    #[test]
    fn violation_messages_name_the_ids() {
        let violation = MetadataViolation::UnknownEndpoint {
            id: TransitionId(20),
            state: StateId(77),
        };
        assert_eq!(
            violation.to_string(),
            "Transition 20 references unknown state 77"
        );
    }
}
