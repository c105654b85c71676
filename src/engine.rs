//! The workflow transition engine.
//!
//! Pure state logic: given a workflow definition and a project record,
//! evaluate a requested action and mutate the record (or refuse without
//! touching it). Persistence and notification delivery stay in the
//! service layer.

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::Policy;
use crate::notify::{self, Notification};
use crate::project::{HistoryKind, Project, User};
use crate::workflow::{Step, Transition, Workflow};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("action '{action}' is not available from status '{status}'")]
    ActionNotAllowed { action: String, status: String },

    #[error("no workflow step matches status '{status}' / division '{division}'")]
    WorkflowStepMismatch { status: String, division: String },

    #[error("step '{step}' has no revision target")]
    RevisionNotSupported { step: String },

    #[error("user '{username}' is not permitted to {action}")]
    Unauthorized { username: String, action: String },
}

/// Result of marking one division's portion of a parallel step done.
#[derive(Debug)]
pub enum MarkOutcome {
    /// Division had already reported; nothing changed.
    AlreadyRecorded,
    /// Flag recorded, step unchanged, `remaining` divisions still pending.
    Recorded { remaining: usize },
    /// This was the last required division; the completion transition fired.
    Transitioned { notification: Option<Notification> },
}

/// Fields written by a manual override. No step-matching validation is
/// applied to these, which is the point of the escape hatch.
#[derive(Debug, Clone)]
pub struct OverrideRequest {
    pub status: String,
    pub assigned_division: String,
    pub next_action: Option<String>,
    pub progress: u8,
}

pub struct WorkflowEngine<'a> {
    workflow: &'a Workflow,
    policy: &'a Policy,
}

impl<'a> WorkflowEngine<'a> {
    pub fn new(workflow: &'a Workflow, policy: &'a Policy) -> Self {
        Self { workflow, policy }
    }

    fn current_step(&self, project: &Project) -> Result<&'a Step, EngineError> {
        self.workflow
            .steps
            .get(project.current_step)
            .ok_or_else(|| EngineError::WorkflowStepMismatch {
                status: project.status.clone(),
                division: project.assigned_division.clone(),
            })
    }

    fn target_index(&self, transition: &Transition) -> Result<usize, EngineError> {
        self.workflow
            .find_step(&transition.status, &transition.assigned_division)
            .ok_or_else(|| EngineError::WorkflowStepMismatch {
                status: transition.status.clone(),
                division: transition.assigned_division.clone(),
            })
    }

    /// Copy the transition's target fields onto the project, move the step
    /// pointer, and append the single history entry for the fired action.
    /// `target` must already be resolved so this cannot fail part-way.
    fn apply_transition(
        &self,
        project: &mut Project,
        action: &str,
        transition: &Transition,
        target: usize,
        actor: &str,
        role: &str,
        note: Option<String>,
    ) -> Option<Notification> {
        project.status = transition.status.clone();
        project.assigned_division = transition.assigned_division.clone();
        project.next_action = transition.next_action.clone();
        project.progress = transition.progress;
        project.current_step = target;
        project.division_completions.clear();
        project.record(HistoryKind::Action, actor, role, action, note);

        info!(
            project_id = %project.id,
            action = %action,
            status = %project.status,
            division = %project.assigned_division,
            progress = %project.progress,
            actor = %actor,
            "Project advanced"
        );

        transition
            .notification
            .as_ref()
            .map(|spec| notify::render(spec, project))
    }

    /// Fire `action` from the project's current step. Fails without
    /// mutating the record; every check happens before the first write.
    pub fn advance(
        &self,
        project: &mut Project,
        action: &str,
        actor: &User,
        note: Option<String>,
    ) -> Result<Option<Notification>, EngineError> {
        let step = self.current_step(project)?;
        let role = self
            .policy
            .acting_role(actor, &project.assigned_division)
            .ok_or_else(|| EngineError::Unauthorized {
                username: actor.username.clone(),
                action: format!("fire '{}'", action),
            })?;
        let transition =
            step.transitions
                .get(action)
                .ok_or_else(|| EngineError::ActionNotAllowed {
                    action: action.to_string(),
                    status: project.status.clone(),
                })?;
        let target = self.target_index(transition)?;
        Ok(self.apply_transition(project, action, transition, target, &actor.username, &role, note))
    }

    /// Roll the project back to the current step's configured revision
    /// target. Files belonging to the steps being redone are archived on
    /// the record; the reason note lands in history.
    pub fn revise(
        &self,
        project: &mut Project,
        actor: &User,
        note: &str,
    ) -> Result<(), EngineError> {
        let step = self.current_step(project)?;
        let role = self
            .policy
            .acting_role(actor, &project.assigned_division)
            .ok_or_else(|| EngineError::Unauthorized {
                username: actor.username.clone(),
                action: "request a revision".to_string(),
            })?;
        let target_name =
            step.revision_target
                .as_deref()
                .ok_or_else(|| EngineError::RevisionNotSupported {
                    step: step.step_name.clone(),
                })?;
        // Validation guarantees the target exists and precedes this step.
        let target_index = self.workflow.step_index_by_name(target_name).ok_or_else(|| {
            EngineError::WorkflowStepMismatch {
                status: target_name.to_string(),
                division: String::new(),
            }
        })?;

        let redone: Vec<&str> = self.workflow.steps[target_index..=project.current_step]
            .iter()
            .map(|s| s.step_name.as_str())
            .collect();
        for file in &mut project.files {
            if redone.contains(&file.step_name.as_str()) {
                file.archived = true;
            }
        }

        let target = &self.workflow.steps[target_index];
        project.status = target.status.clone();
        project.assigned_division = target.assigned_division.clone();
        project.next_action = target.next_action.clone();
        project.progress = target.progress;
        project.current_step = target_index;
        project.division_completions.clear();
        project.record(
            HistoryKind::Revision,
            &actor.username,
            &role,
            "revise",
            Some(note.to_string()),
        );

        info!(
            project_id = %project.id,
            target_step = %target.step_name,
            actor = %actor.username,
            "Project rolled back for revision"
        );
        Ok(())
    }

    /// Record one division's completion on a parallel step. Idempotent:
    /// re-marking a division that already reported is a no-op. Once the
    /// full required set has reported, the step's completion transition
    /// fires, appending exactly one history entry.
    pub fn mark_division_complete(
        &self,
        project: &mut Project,
        division: &str,
        actor: &User,
    ) -> Result<MarkOutcome, EngineError> {
        let step = self.current_step(project)?;
        let parallel = step
            .parallel
            .as_ref()
            .ok_or_else(|| EngineError::ActionNotAllowed {
                action: format!("mark '{}' complete", division),
                status: project.status.clone(),
            })?;
        if !parallel.divisions.contains(division) {
            return Err(EngineError::ActionNotAllowed {
                action: format!("mark '{}' complete", division),
                status: project.status.clone(),
            });
        }
        if !self.policy.can_mark_complete(actor, division) {
            return Err(EngineError::Unauthorized {
                username: actor.username.clone(),
                action: format!("mark '{}' complete", division),
            });
        }
        if project.division_completions.contains(division) {
            return Ok(MarkOutcome::AlreadyRecorded);
        }

        // Resolve the completion transition up front so the flag insert and
        // the automatic firing cannot come apart.
        let transition = step.transitions.get(&parallel.completion_action).ok_or_else(|| {
            EngineError::ActionNotAllowed {
                action: parallel.completion_action.clone(),
                status: project.status.clone(),
            }
        })?;
        let target = self.target_index(transition)?;

        project.division_completions.insert(division.to_string());
        project.updated_at = chrono::Utc::now();

        let remaining = parallel
            .divisions
            .iter()
            .filter(|d| !project.division_completions.contains(*d))
            .count();
        if remaining > 0 {
            info!(
                project_id = %project.id,
                division = %division,
                remaining = %remaining,
                "Division completion recorded"
            );
            return Ok(MarkOutcome::Recorded { remaining });
        }

        let role = self
            .policy
            .acting_role(actor, division)
            .unwrap_or_else(|| division.to_string());
        let notification = self.apply_transition(
            project,
            &parallel.completion_action,
            transition,
            target,
            &actor.username,
            &role,
            None,
        );
        Ok(MarkOutcome::Transitioned { notification })
    }

    /// Administrative escape hatch: set fields directly, bypassing the
    /// transition table. The caller is responsible for the admin gate; this
    /// method performs no step-matching validation. If the written pair
    /// happens to match a step, the pointer follows it; otherwise the
    /// pointer stays where it was.
    pub fn apply_manual_override(
        &self,
        project: &mut Project,
        request: OverrideRequest,
        admin: &User,
        role: &str,
        reason: &str,
    ) {
        warn!(
            project_id = %project.id,
            admin = %admin.username,
            status = %request.status,
            division = %request.assigned_division,
            reason = %reason,
            "Manual override applied"
        );
        if let Some(index) = self
            .workflow
            .find_step(&request.status, &request.assigned_division)
        {
            project.current_step = index;
        }
        project.status = request.status;
        project.assigned_division = request.assigned_division;
        project.next_action = request.next_action;
        project.progress = request.progress;
        project.division_completions.clear();
        project.record(
            HistoryKind::ManualOverride,
            &admin.username,
            role,
            "manual_override",
            Some(reason.to_string()),
        );
    }

    /// Transition keys of the current step the user may fire. Empty when
    /// the step is terminal, the pointer is stale, or the user holds
    /// neither the assigned division nor an admin role.
    pub fn eligible_actions(&self, project: &Project, actor: &User) -> Vec<String> {
        let Ok(step) = self.current_step(project) else {
            return vec![];
        };
        if !self.policy.can_fire(actor, &project.assigned_division) {
            return vec![];
        }
        step.transitions.keys().cloned().collect()
    }
}
