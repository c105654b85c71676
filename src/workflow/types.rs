use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A named workflow template: an ordered list of steps a project moves
/// through. Treated as an immutable value once loaded for an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<Step>,
}

/// One node of a workflow's status graph. A step with an empty transition
/// map is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step_name: String,
    pub status: String,
    pub assigned_division: String,
    pub progress: u8,
    #[serde(default)]
    pub next_action: Option<String>,
    #[serde(default)]
    pub transitions: BTreeMap<String, Transition>,
    /// Step name this step rolls back to when a revision is requested.
    /// At most one per step; absence means revision is not supported here.
    #[serde(default)]
    pub revision_target: Option<String>,
    /// Present on steps where several divisions contribute concurrently and
    /// the step only advances once every one of them has reported done.
    #[serde(default)]
    pub parallel: Option<ParallelSpec>,
}

impl Step {
    pub fn is_terminal(&self) -> bool {
        self.transitions.is_empty()
    }
}

/// The effect of firing a named action from a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub status: String,
    pub assigned_division: String,
    #[serde(default)]
    pub next_action: Option<String>,
    pub progress: u8,
    #[serde(default)]
    pub notification: Option<NotificationSpec>,
}

/// Divisions that must each report completion before the step's
/// `completion_action` transition fires automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelSpec {
    pub divisions: BTreeSet<String>,
    /// Key into the step's own transition map, fired once all divisions
    /// have reported.
    pub completion_action: String,
}

/// Notification raised as a side effect of a transition. `division` picks
/// the audience; a missing selector falls back to the transition's target
/// division. `message` may contain `{project}`, `{status}` and `{division}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSpec {
    #[serde(default)]
    pub division: Option<DivisionSelector>,
    pub message: String,
}

/// One division or a list of divisions to fan out to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DivisionSelector {
    One(String),
    Many(Vec<String>),
}

impl Workflow {
    /// First step whose display status and owning division both match.
    /// First match wins; validation rejects workflows where the pair is
    /// ambiguous, so at runtime this is unique.
    pub fn find_step(&self, status: &str, division: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.status == status && s.assigned_division == division)
    }

    pub fn step_index_by_name(&self, step_name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.step_name == step_name)
    }
}
