//! Load-time validation of workflow definitions.
//!
//! Definitions are data, so every structural mistake an author can make is
//! caught here, once, when the definition is loaded or saved. A workflow
//! that passes validation cannot produce a dangling transition target at
//! runtime.

use thiserror::Error;

use super::types::Workflow;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("workflow '{workflow}' has no steps")]
    EmptyWorkflow { workflow: String },

    #[error("duplicate step name '{step_name}'")]
    DuplicateStepName { step_name: String },

    #[error("steps '{first}' and '{second}' share status '{status}' and division '{division}', making transition targets ambiguous")]
    AmbiguousStepPair {
        first: String,
        second: String,
        status: String,
        division: String,
    },

    #[error("step '{step}' action '{action}' targets status '{status}' / division '{division}', which matches no step")]
    DanglingTransition {
        step: String,
        action: String,
        status: String,
        division: String,
    },

    #[error("step '{step}' has revision target '{target}', which names no step")]
    UnknownRevisionTarget { step: String, target: String },

    #[error("step '{step}' has revision target '{target}', which does not precede it")]
    RevisionTargetNotEarlier { step: String, target: String },

    #[error("step '{step}' requires parallel completion but lists no divisions")]
    EmptyParallelDivisions { step: String },

    #[error("step '{step}' parallel completion action '{action}' is not in its transition map")]
    UnknownCompletionAction { step: String, action: String },

    #[error("step '{step}' has progress {progress}, outside 0..=100")]
    ProgressOutOfRange { step: String, progress: u8 },
}

/// Validate a workflow definition. Called by the catalog on every load and
/// save, so a bad definition never reaches the engine.
pub fn validate(workflow: &Workflow) -> Result<(), ValidationError> {
    if workflow.steps.is_empty() {
        return Err(ValidationError::EmptyWorkflow {
            workflow: workflow.id.clone(),
        });
    }

    for (i, step) in workflow.steps.iter().enumerate() {
        if workflow
            .steps
            .iter()
            .skip(i + 1)
            .any(|other| other.step_name == step.step_name)
        {
            return Err(ValidationError::DuplicateStepName {
                step_name: step.step_name.clone(),
            });
        }

        if let Some(other) = workflow.steps.iter().skip(i + 1).find(|other| {
            other.status == step.status && other.assigned_division == step.assigned_division
        }) {
            return Err(ValidationError::AmbiguousStepPair {
                first: step.step_name.clone(),
                second: other.step_name.clone(),
                status: step.status.clone(),
                division: step.assigned_division.clone(),
            });
        }

        if step.progress > 100 {
            return Err(ValidationError::ProgressOutOfRange {
                step: step.step_name.clone(),
                progress: step.progress,
            });
        }

        for (action, transition) in &step.transitions {
            if transition.progress > 100 {
                return Err(ValidationError::ProgressOutOfRange {
                    step: step.step_name.clone(),
                    progress: transition.progress,
                });
            }
            if workflow
                .find_step(&transition.status, &transition.assigned_division)
                .is_none()
            {
                return Err(ValidationError::DanglingTransition {
                    step: step.step_name.clone(),
                    action: action.clone(),
                    status: transition.status.clone(),
                    division: transition.assigned_division.clone(),
                });
            }
        }

        if let Some(target) = &step.revision_target {
            match workflow.step_index_by_name(target) {
                None => {
                    return Err(ValidationError::UnknownRevisionTarget {
                        step: step.step_name.clone(),
                        target: target.clone(),
                    });
                }
                Some(target_index) if target_index >= i => {
                    return Err(ValidationError::RevisionTargetNotEarlier {
                        step: step.step_name.clone(),
                        target: target.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(parallel) = &step.parallel {
            if parallel.divisions.is_empty() {
                return Err(ValidationError::EmptyParallelDivisions {
                    step: step.step_name.clone(),
                });
            }
            if !step.transitions.contains_key(&parallel.completion_action) {
                return Err(ValidationError::UnknownCompletionAction {
                    step: step.step_name.clone(),
                    action: parallel.completion_action.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::{ParallelSpec, Step, Transition};
    use std::collections::{BTreeMap, BTreeSet};

    fn step(name: &str, status: &str, division: &str, progress: u8) -> Step {
        Step {
            step_name: name.to_string(),
            status: status.to_string(),
            assigned_division: division.to_string(),
            progress,
            next_action: None,
            transitions: BTreeMap::new(),
            revision_target: None,
            parallel: None,
        }
    }

    fn transition(status: &str, division: &str, progress: u8) -> Transition {
        Transition {
            status: status.to_string(),
            assigned_division: division.to_string(),
            next_action: None,
            progress,
            notification: None,
        }
    }

    fn workflow(steps: Vec<Step>) -> Workflow {
        Workflow {
            id: "wf-test".to_string(),
            name: "Test".to_string(),
            description: String::new(),
            steps,
        }
    }

    #[test]
    fn accepts_linear_workflow() {
        let mut draft = step("Draft", "Draft", "Arsitek", 10);
        draft
            .transitions
            .insert("submit".to_string(), transition("Review", "Admin", 50));
        let review = step("Review", "Review", "Admin", 50);
        assert_eq!(validate(&workflow(vec![draft, review])), Ok(()));
    }

    #[test]
    fn rejects_empty_workflow() {
        let err = validate(&workflow(vec![])).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyWorkflow { .. }));
    }

    #[test]
    fn rejects_dangling_transition_target() {
        let mut draft = step("Draft", "Draft", "Arsitek", 10);
        draft
            .transitions
            .insert("submit".to_string(), transition("Nowhere", "Admin", 50));
        let err = validate(&workflow(vec![draft])).unwrap_err();
        assert!(matches!(err, ValidationError::DanglingTransition { .. }));
    }

    #[test]
    fn rejects_ambiguous_status_division_pair() {
        let a = step("A", "Review", "Admin", 40);
        let b = step("B", "Review", "Admin", 60);
        let err = validate(&workflow(vec![a, b])).unwrap_err();
        assert!(matches!(err, ValidationError::AmbiguousStepPair { .. }));
    }

    #[test]
    fn rejects_revision_target_that_does_not_precede() {
        let mut first = step("First", "Draft", "Arsitek", 10);
        first.revision_target = Some("First".to_string());
        let err = validate(&workflow(vec![first])).unwrap_err();
        assert!(matches!(err, ValidationError::RevisionTargetNotEarlier { .. }));
    }

    #[test]
    fn rejects_parallel_step_without_completion_transition() {
        let mut parallel = step("Design", "Design", "Teknik", 30);
        parallel.parallel = Some(ParallelSpec {
            divisions: BTreeSet::from(["Arsitek".to_string(), "MEP".to_string()]),
            completion_action: "finish_design".to_string(),
        });
        let err = validate(&workflow(vec![parallel])).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownCompletionAction { .. }));
    }
}
